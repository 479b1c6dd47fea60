use serde_json::Value;

use crate::{
  Result,
  setting::{self, Setting},
  store::RecordStore,
};

use super::{all_records, get_record, update_record};

/// The flat key/value `settings` table.
#[derive(Debug)]
pub struct Settings<'a, S> {
  store: &'a S,
}

impl<'a, S: RecordStore> Settings<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn get(&self, key: &str) -> Result<Option<Value>> {
    let stored: Option<Setting> = get_record(self.store, key).await?;
    Ok(stored.map(|s| s.value))
  }

  /// Insert or replace the value under `key`.
  pub async fn set(&self, key: &str, value: Value) -> Result<()> {
    update_record(self.store, Setting::new(key, value)).await
  }

  pub async fn get_all(&self) -> Result<Vec<Setting>> {
    all_records(self.store).await
  }

  /// The stored argon2 PHC string, if a password has been set.
  pub async fn password_hash(&self) -> Result<Option<String>> {
    self.get_str(setting::PASSWORD_HASH).await
  }

  pub async fn theme(&self) -> Result<Option<String>> {
    self.get_str(setting::THEME).await
  }

  async fn get_str(&self, key: &str) -> Result<Option<String>> {
    Ok(match self.get(key).await? {
      Some(Value::String(s)) => Some(s),
      _ => None,
    })
  }
}
