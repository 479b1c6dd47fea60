//! Services: the catalog of resold subscriptions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{Index, Record, Table},
};

/// A catalog entry. `code` is unique across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
  pub id:         String,
  pub code:       String,
  pub name:       String,
  /// List price in currency units.
  pub price:      Decimal,
  /// Subscription length in days.
  pub duration:   u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

impl Service {
  pub fn validate(&self) -> Result<()> {
    if self.code.trim().is_empty() {
      return Err(Error::InvalidRecord("service code must not be empty".into()));
    }
    if self.name.trim().is_empty() {
      return Err(Error::InvalidRecord("service name must not be empty".into()));
    }
    if self.price <= Decimal::ZERO {
      return Err(Error::InvalidRecord(format!(
        "service {:?} must have a positive price, got {}",
        self.code, self.price
      )));
    }
    if self.duration == 0 {
      return Err(Error::InvalidRecord(format!(
        "service {:?} must last at least one day",
        self.code
      )));
    }
    Ok(())
  }

  /// Case-insensitive substring match against name or code.
  pub fn matches_text(&self, query: &str) -> bool {
    let needle = query.to_lowercase();
    self.name.to_lowercase().contains(&needle)
      || self.code.to_lowercase().contains(&needle)
  }
}

/// Normalise a human-entered service code.
pub fn normalize_code(code: &str) -> String { code.trim().to_lowercase() }

/// Secondary indexes on the `services` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceIndex {
  Code,
}

impl Index for ServiceIndex {
  const ALL: &'static [Self] = &[Self::Code];

  fn name(self) -> &'static str { "code" }

  fn column(self) -> &'static str { "code" }

  fn is_unique(self) -> bool { true }
}

impl Record for Service {
  const TABLE: Table = Table::Services;
  type Index = ServiceIndex;

  fn key(&self) -> &str { &self.id }

  fn index_value(&self, index: ServiceIndex) -> Option<String> {
    match index {
      ServiceIndex::Code => Some(self.code.clone()),
    }
  }
}

/// Input to [`Services::add_new`](crate::repo::Services::add_new).
#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
  pub code:     String,
  pub name:     String,
  pub price:    Decimal,
  #[serde(default = "default_duration")]
  pub duration: u32,
}

fn default_duration() -> u32 { 30 }
