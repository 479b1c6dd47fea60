//! The portable full-dataset snapshot used for backup and restore.
//!
//! ```json
//! {
//!   "clients": [...], "purchases": [...], "services": [...],
//!   "settings": [{"key": "theme", "value": "dark"}],
//!   "exportedAt": "2024-06-15T12:00:00Z",
//!   "schemaVersion": 1
//! }
//! ```
//!
//! Any of the four sequences may be absent on import and is then treated as
//! empty.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  client::Client,
  purchase::Purchase,
  record::{Record, Table},
  service::{Service, normalize_code},
  setting::{self, Setting},
};

/// Snapshot layout version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  #[serde(default)]
  pub clients:        Vec<Client>,
  #[serde(default)]
  pub purchases:      Vec<Purchase>,
  #[serde(default)]
  pub services:       Vec<Service>,
  #[serde(default)]
  pub settings:       Vec<Setting>,
  #[serde(default)]
  pub exported_at:    Option<DateTime<Utc>>,
  #[serde(default = "current_version", alias = "version")]
  pub schema_version: u32,
}

fn current_version() -> u32 { SCHEMA_VERSION }

impl Snapshot {
  /// Parse and validate a snapshot from JSON text.
  pub fn parse(json: &str) -> Result<Self> {
    let snapshot: Self = serde_json::from_str(json)
      .map_err(|e| Error::MalformedSnapshot(e.to_string()))?;
    snapshot.validate()?;
    Ok(snapshot)
  }

  /// Download name for a backup taken on the day of `exported_at`.
  pub fn file_name(&self) -> String {
    let day = self.exported_at.unwrap_or_else(Utc::now).date_naive();
    format!("easystream_backup_{day}.json")
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Structural checks that must pass before any table is cleared.
  pub fn validate(&self) -> Result<()> {
    if self.schema_version > SCHEMA_VERSION {
      return Err(Error::MalformedSnapshot(format!(
        "unsupported schema version {} (newest known is {SCHEMA_VERSION})",
        self.schema_version
      )));
    }

    unique_keys(&self.clients)?;
    unique_keys(&self.purchases)?;
    unique_keys(&self.services)?;
    unique_keys(&self.settings)?;

    let mut codes = HashSet::new();
    for service in &self.services {
      if !codes.insert(normalize_code(&service.code)) {
        return Err(Error::MalformedSnapshot(format!(
          "service code {:?} appears more than once",
          service.code
        )));
      }
    }
    Ok(())
  }

  /// Bring service codes, and the codes purchases carry, to their stored
  /// form, so imported data matches code lookups.
  pub fn normalize_codes(&mut self) {
    for service in &mut self.services {
      service.code = normalize_code(&service.code);
    }
    for purchase in &mut self.purchases {
      purchase.service_code = normalize_code(&purchase.service_code);
    }
  }

  /// Drop credential settings such as the password hash.
  pub fn strip_credentials(&mut self) {
    self.settings.retain(|s| !setting::is_credential(&s.key));
  }

  /// Number of records per table, in [`Table::ALL`] order.
  pub fn counts(&self) -> [(Table, usize); 4] {
    [
      (Table::Clients, self.clients.len()),
      (Table::Purchases, self.purchases.len()),
      (Table::Services, self.services.len()),
      (Table::Settings, self.settings.len()),
    ]
  }
}

fn unique_keys<R: Record>(records: &[R]) -> Result<()> {
  let mut seen = HashSet::new();
  for record in records {
    if !seen.insert(record.key()) {
      return Err(Error::MalformedSnapshot(format!(
        "{} contains key {:?} more than once",
        R::TABLE,
        record.key()
      )));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_sequences_default_to_empty() {
    let snapshot = Snapshot::parse(r#"{"services": []}"#).unwrap();
    assert!(snapshot.clients.is_empty());
    assert!(snapshot.settings.is_empty());
    assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
  }

  #[test]
  fn legacy_version_key_is_accepted() {
    let snapshot = Snapshot::parse(r#"{"version": 1}"#).unwrap();
    assert_eq!(snapshot.schema_version, 1);
  }

  #[test]
  fn file_name_uses_the_export_day() {
    let mut snapshot = Snapshot::parse("{}").unwrap();
    snapshot.exported_at = Some("2024-06-15T23:10:00Z".parse().unwrap());
    assert_eq!(snapshot.file_name(), "easystream_backup_2024-06-15.json");
  }

  #[test]
  fn codes_differing_only_in_case_are_duplicates() {
    let json = r#"{"services": [
      {"id": "1", "code": "Netflix", "name": "Netflix", "price": 39.9, "duration": 30},
      {"id": "2", "code": "netflix ", "name": "Other", "price": 10.0, "duration": 30}
    ]}"#;
    assert!(matches!(Snapshot::parse(json), Err(Error::MalformedSnapshot(_))));
  }

  #[test]
  fn normalizing_and_stripping() {
    let mut snapshot = Snapshot::parse(
      r#"{
        "services": [{"id": "1", "code": " Netflix", "name": "N", "price": 1.0, "duration": 30}],
        "settings": [
          {"key": "theme", "value": "dark"},
          {"key": "password_hash", "value": "$argon2id$v=19$x"}
        ]
      }"#,
    )
    .unwrap();
    snapshot.normalize_codes();
    snapshot.strip_credentials();

    assert_eq!(snapshot.services[0].code, "netflix");
    assert_eq!(snapshot.settings, vec![Setting::new("theme", "dark".into())]);
  }

  #[test]
  fn garbage_is_malformed() {
    assert!(matches!(Snapshot::parse("not json"), Err(Error::MalformedSnapshot(_))));
    assert!(matches!(
      Snapshot::parse(r#"{"clients": 3}"#),
      Err(Error::MalformedSnapshot(_))
    ));
  }

  #[test]
  fn future_versions_are_rejected() {
    assert!(matches!(
      Snapshot::parse(r#"{"schemaVersion": 2}"#),
      Err(Error::MalformedSnapshot(_))
    ));
  }

  #[test]
  fn duplicate_keys_and_codes_are_rejected() {
    let dup_settings = r#"{"settings": [{"key": "a", "value": 1}, {"key": "a", "value": 2}]}"#;
    assert!(matches!(Snapshot::parse(dup_settings), Err(Error::MalformedSnapshot(_))));

    let dup_codes = r#"{"services": [
      {"id": "1", "code": "x", "name": "X", "price": 1.0, "duration": 30},
      {"id": "2", "code": "x", "name": "Y", "price": 2.0, "duration": 30}
    ]}"#;
    assert!(matches!(Snapshot::parse(dup_codes), Err(Error::MalformedSnapshot(_))));
  }
}
