//! Settings: a flat key/value table.

use serde::{Deserialize, Serialize};

use crate::record::{NoIndex, Record, Table};

/// Key of the UI theme setting.
pub const THEME: &str = "theme";

/// Key of the argon2 PHC string guarding the panel.
pub const PASSWORD_HASH: &str = "password_hash";

/// Settings that guard the panel. They never travel in a snapshot and
/// survive both an import and a full clear.
pub fn is_credential(key: &str) -> bool { key == PASSWORD_HASH }

/// One key/value pair. Values are not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
  pub key:   String,
  pub value: serde_json::Value,
}

impl Setting {
  pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
    Self { key: key.into(), value }
  }
}

impl Record for Setting {
  const TABLE: Table = Table::Settings;
  type Index = NoIndex;

  fn key(&self) -> &str { &self.key }

  fn index_value(&self, index: NoIndex) -> Option<String> { match index {} }
}
