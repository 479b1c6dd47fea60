//! Typed repositories over a [`RecordStore`].
//!
//! Each repository borrows the store and exposes the named operations of one
//! entity. Constraint violations coming back from the store are re-signalled
//! as the specific [`Error`] variant; every other backend failure becomes
//! [`Error::Storage`].

mod clients;
mod purchases;
mod services;
mod settings;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer};

pub use clients::Clients;
pub use purchases::{PurchaseFilter, Purchases};
pub use services::Services;
pub use settings::Settings;

use crate::{
  Error, Result,
  record::{Record, unique_entry},
  store::RecordStore,
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// A list filter where `"all"` bypasses filtering entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter<T> {
  #[default]
  All,
  Only(T),
}

impl<T> Filter<T> {
  pub fn as_option(&self) -> Option<&T> {
    match self {
      Self::All => None,
      Self::Only(v) => Some(v),
    }
  }
}

impl<T: FromStr> FromStr for Filter<T> {
  type Err = T::Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      Ok(Self::All)
    } else {
      s.parse().map(Self::Only)
    }
  }
}

impl<'de, T> Deserialize<'de> for Filter<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Shared plumbing ─────────────────────────────────────────────────────────

pub(crate) async fn add_record<S: RecordStore, R: Record>(
  store: &S,
  record: R,
) -> Result<()> {
  let key = record.key().to_owned();
  let unique = unique_entry(&record);
  store
    .add(record)
    .await
    .map_err(|e| Error::from_store(e, R::TABLE, &key, unique))
}

pub(crate) async fn update_record<S: RecordStore, R: Record>(
  store: &S,
  record: R,
) -> Result<()> {
  let key = record.key().to_owned();
  let unique = unique_entry(&record);
  store
    .update(record)
    .await
    .map_err(|e| Error::from_store(e, R::TABLE, &key, unique))
}

pub(crate) async fn get_record<S: RecordStore, R: Record>(
  store: &S,
  key: &str,
) -> Result<Option<R>> {
  store.get(key).await.map_err(Error::storage)
}

pub(crate) async fn all_records<S: RecordStore, R: Record>(store: &S) -> Result<Vec<R>> {
  store.get_all().await.map_err(Error::storage)
}

pub(crate) async fn delete_record<S: RecordStore, R: Record>(
  store: &S,
  key: &str,
) -> Result<bool> {
  store.delete::<R>(key).await.map_err(Error::storage)
}

pub(crate) async fn query_records<S: RecordStore, R: Record>(
  store: &S,
  index: R::Index,
  value: &str,
) -> Result<Vec<R>> {
  store.query_by_index(index, value).await.map_err(Error::storage)
}

pub(crate) async fn clear_records<S: RecordStore, R: Record>(store: &S) -> Result<()> {
  store.clear::<R>().await.map_err(Error::storage)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::ClientStatus;

  #[test]
  fn all_bypasses_and_values_parse() {
    assert_eq!("all".parse::<Filter<ClientStatus>>().unwrap(), Filter::All);
    assert_eq!(
      "inactive".parse::<Filter<ClientStatus>>().unwrap(),
      Filter::Only(ClientStatus::Inactive)
    );
    assert!("bogus".parse::<Filter<ClientStatus>>().is_err());
  }

  #[test]
  fn filters_deserialise_from_strings() {
    let f: Filter<String> = serde_json::from_str(r#""netflix""#).unwrap();
    assert_eq!(f, Filter::Only("netflix".to_owned()));
  }
}
