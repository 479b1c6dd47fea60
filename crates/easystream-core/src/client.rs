//! Clients: the customers subscriptions are resold to.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{Index, Record, Table};

/// Whether a client is still being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
  #[default]
  Active,
  Inactive,
}

impl ClientStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
    }
  }
}

impl fmt::Display for ClientStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ClientStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "inactive" => Ok(Self::Inactive),
      other => Err(format!("unknown client status: {other:?}")),
    }
  }
}

/// A customer.
///
/// `total_purchases` and `last_purchase` are caches over the purchase table.
/// They are only written through
/// [`Panel::record_purchase_for`](crate::panel::Panel::record_purchase_for)
/// and may drift if that step is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
  pub id:                String,
  pub name:              String,
  pub whats_app:         String,
  #[serde(default)]
  pub email:             Option<String>,
  #[serde(default)]
  pub cpf:               Option<String>,
  #[serde(default)]
  pub address:           Option<String>,
  #[serde(default)]
  pub notes:             Option<String>,
  pub registration_date: NaiveDate,
  #[serde(default)]
  pub status:            ClientStatus,
  #[serde(default)]
  pub total_purchases:   u32,
  #[serde(default)]
  pub last_purchase:     Option<NaiveDate>,
}

impl Client {
  /// A freshly registered, active client with no purchases.
  pub fn new(
    id: String,
    name: String,
    whats_app: String,
    registration_date: NaiveDate,
  ) -> Self {
    Self {
      id,
      name,
      whats_app,
      email: None,
      cpf: None,
      address: None,
      notes: None,
      registration_date,
      status: ClientStatus::Active,
      total_purchases: 0,
      last_purchase: None,
    }
  }

  /// Case-insensitive substring match against name or WhatsApp number.
  pub fn matches_text(&self, query: &str) -> bool {
    let needle = query.to_lowercase();
    self.name.to_lowercase().contains(&needle)
      || self.whats_app.to_lowercase().contains(&needle)
  }
}

/// Secondary indexes on the `clients` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIndex {
  WhatsApp,
  Name,
  Status,
}

impl Index for ClientIndex {
  const ALL: &'static [Self] = &[Self::WhatsApp, Self::Name, Self::Status];

  fn name(self) -> &'static str {
    match self {
      Self::WhatsApp => "whatsApp",
      Self::Name => "name",
      Self::Status => "status",
    }
  }

  fn column(self) -> &'static str {
    match self {
      Self::WhatsApp => "whats_app",
      Self::Name => "name",
      Self::Status => "status",
    }
  }
}

impl Record for Client {
  const TABLE: Table = Table::Clients;
  type Index = ClientIndex;

  fn key(&self) -> &str { &self.id }

  fn index_value(&self, index: ClientIndex) -> Option<String> {
    Some(match index {
      ClientIndex::WhatsApp => self.whats_app.clone(),
      ClientIndex::Name => self.name.clone(),
      ClientIndex::Status => self.status.as_str().to_owned(),
    })
  }
}

// ─── NewClient ───────────────────────────────────────────────────────────────

/// Input to [`Panel::register_client`](crate::panel::Panel::register_client).
/// Identity, registration date and status are assigned by the panel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
  pub name:      String,
  pub whats_app: String,
  #[serde(default)]
  pub email:     Option<String>,
  #[serde(default)]
  pub cpf:       Option<String>,
  #[serde(default)]
  pub address:   Option<String>,
  #[serde(default)]
  pub notes:     Option<String>,
}

/// Trim a free-text field, turning blanks into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
