//! Purchases: one resold subscription for one client.
//!
//! The service fields are a snapshot taken at purchase time and are never
//! re-synchronised with the catalog.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  record::{Index, Record, Table},
  status::purchase_status,
};

/// The lifecycle state of a purchase.
///
/// Only `Active`, `Warning` and `Expired` are ever derived from an expiry
/// date. `Pending` and `Inactive` are legacy values still accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
  Active,
  Warning,
  Expired,
  Pending,
  Inactive,
}

impl PurchaseStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Warning => "warning",
      Self::Expired => "expired",
      Self::Pending => "pending",
      Self::Inactive => "inactive",
    }
  }

  /// Human-readable label for tables and reports.
  pub fn label(self) -> &'static str {
    match self {
      Self::Active => "Active",
      Self::Warning => "Expiring",
      Self::Expired => "Expired",
      Self::Pending => "Pending",
      Self::Inactive => "Inactive",
    }
  }
}

impl fmt::Display for PurchaseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PurchaseStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "warning" => Ok(Self::Warning),
      "expired" => Ok(Self::Expired),
      "pending" => Ok(Self::Pending),
      "inactive" => Ok(Self::Inactive),
      other => Err(format!("unknown purchase status: {other:?}")),
    }
  }
}

/// A subscription sold to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
  pub id:            String,
  /// Owning client. Not enforced by the store; may dangle after a
  /// non-cascading client deletion.
  pub client_id:     String,
  pub service_id:    String,
  pub service_code:  String,
  pub service_name:  String,
  /// The amount actually charged.
  pub value:         Decimal,
  pub purchase_date: NaiveDate,
  pub expiry_date:   NaiveDate,
  pub status:        PurchaseStatus,
  #[serde(default)]
  pub ggmax_link:    String,
  #[serde(default)]
  pub code:          String,
  #[serde(default)]
  pub password:      String,
  #[serde(default)]
  pub notes:         String,
  /// Set once on creation; renewals start without one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:    Option<DateTime<Utc>>,
}

impl Purchase {
  /// Status derived from the expiry date, ignoring the stored value.
  pub fn current_status(&self, today: NaiveDate) -> PurchaseStatus {
    purchase_status(self.expiry_date, today)
  }

  /// A renewal: same client, service and credentials under a fresh identity,
  /// starting `today` and running `days` days. `created_at` is dropped.
  pub fn renewal(&self, id: String, today: NaiveDate, days: u32) -> Self {
    let expiry_date = today + chrono::Days::new(u64::from(days));
    Self {
      id,
      purchase_date: today,
      expiry_date,
      status: purchase_status(expiry_date, today),
      created_at: None,
      ..self.clone()
    }
  }
}

/// Secondary indexes on the `purchases` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseIndex {
  ClientId,
  ServiceCode,
  Status,
  ExpiryDate,
  PurchaseDate,
}

impl Index for PurchaseIndex {
  const ALL: &'static [Self] = &[
    Self::ClientId,
    Self::ServiceCode,
    Self::Status,
    Self::ExpiryDate,
    Self::PurchaseDate,
  ];

  fn name(self) -> &'static str {
    match self {
      Self::ClientId => "clientId",
      Self::ServiceCode => "serviceCode",
      Self::Status => "status",
      Self::ExpiryDate => "expiryDate",
      Self::PurchaseDate => "purchaseDate",
    }
  }

  fn column(self) -> &'static str {
    match self {
      Self::ClientId => "client_id",
      Self::ServiceCode => "service_code",
      Self::Status => "status",
      Self::ExpiryDate => "expiry_date",
      Self::PurchaseDate => "purchase_date",
    }
  }
}

impl Record for Purchase {
  const TABLE: Table = Table::Purchases;
  type Index = PurchaseIndex;

  fn key(&self) -> &str { &self.id }

  fn index_value(&self, index: PurchaseIndex) -> Option<String> {
    Some(match index {
      PurchaseIndex::ClientId => self.client_id.clone(),
      PurchaseIndex::ServiceCode => self.service_code.clone(),
      PurchaseIndex::Status => self.status.as_str().to_owned(),
      PurchaseIndex::ExpiryDate => self.expiry_date.to_string(),
      PurchaseIndex::PurchaseDate => self.purchase_date.to_string(),
    })
  }
}

// ─── NewPurchase ─────────────────────────────────────────────────────────────

/// Input to [`Panel::record_purchase`](crate::panel::Panel::record_purchase).
///
/// One purchase is created per entry in `service_ids`; `total_value` is split
/// evenly between them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
  pub client_id:     String,
  pub service_ids:   Vec<String>,
  pub total_value:   Decimal,
  pub purchase_date: NaiveDate,
  pub expiry_date:   NaiveDate,
  #[serde(default)]
  pub ggmax_link:    String,
  #[serde(default)]
  pub code:          String,
  #[serde(default)]
  pub password:      String,
  #[serde(default)]
  pub notes:         String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn purchase() -> Purchase {
    Purchase {
      id:            "p1".into(),
      client_id:     "c1".into(),
      service_id:    "1".into(),
      service_code:  "netflix".into(),
      service_name:  "Netflix 4K Ultra HD".into(),
      value:         Decimal::new(3990, 2),
      purchase_date: date(2024, 1, 1),
      expiry_date:   date(2024, 1, 31),
      status:        PurchaseStatus::Active,
      ggmax_link:    "https://example.com/order/1".into(),
      code:          "ABC".into(),
      password:      "secret".into(),
      notes:         String::new(),
      created_at:    Some(Utc::now()),
    }
  }

  #[test]
  fn renewal_refreshes_dates_and_identity() {
    let old = purchase();
    let today = date(2024, 3, 10);
    let renewed = old.renewal("p2".into(), today, 30);

    assert_eq!(renewed.id, "p2");
    assert_eq!(renewed.purchase_date, today);
    assert_eq!(renewed.expiry_date, date(2024, 4, 9));
    assert_eq!(renewed.status, PurchaseStatus::Active);
    assert!(renewed.created_at.is_none());
    assert_eq!(renewed.client_id, old.client_id);
    assert_eq!(renewed.password, old.password);
  }

  #[test]
  fn legacy_statuses_deserialise() {
    let mut json = serde_json::to_value(purchase()).unwrap();
    json["status"] = "pending".into();
    let p: Purchase = serde_json::from_value(json).unwrap();
    assert_eq!(p.status, PurchaseStatus::Pending);
  }

  #[test]
  fn date_indexes_use_iso_dates() {
    let p = purchase();
    assert_eq!(
      p.index_value(PurchaseIndex::ExpiryDate).as_deref(),
      Some("2024-01-31")
    );
  }
}
