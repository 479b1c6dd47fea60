//! Error types for `easystream-core`.

use thiserror::Error;

use crate::{
  record::Table,
  store::{StoreError, Violation},
};

#[derive(Debug, Error)]
pub enum Error {
  /// A record with the same primary key already exists in `table`.
  #[error("{table} already contains a record with key {key:?}")]
  DuplicateKey { table: Table, key: String },

  /// A declared-unique secondary index collided (only `services.code`).
  #[error("{table}.{index} must be unique; {value:?} is already taken")]
  UniqueConstraint {
    table: Table,
    index: &'static str,
    value: String,
  },

  /// A service cannot be deleted while purchases still reference its code.
  #[error("service {code:?} is referenced by {purchases} purchase(s)")]
  ServiceInUse { code: String, purchases: usize },

  #[error("client not found: {0}")]
  ClientNotFound(String),

  #[error("purchase not found: {0}")]
  PurchaseNotFound(String),

  #[error("service not found: {0}")]
  ServiceNotFound(String),

  #[error("invalid record: {0}")]
  InvalidRecord(String),

  /// The snapshot could not be parsed or failed structural validation. No
  /// table has been touched when this is returned.
  #[error("malformed snapshot: {0}")]
  MalformedSnapshot(String),

  /// An import failed after clearing had begun; the store is left partially
  /// restored.
  #[error("import interrupted while restoring {table}: {source}")]
  ImportInterrupted {
    table:  Table,
    #[source]
    source: Box<Error>,
  },

  #[error("storage fault: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Re-signal a backend error with the specific constraint kind it carries.
  ///
  /// `key` is the primary key of the record involved and `unique` the value
  /// of the unique index, if the table declares one.
  pub(crate) fn from_store<E: StoreError>(
    err: E,
    table: Table,
    key: &str,
    unique: Option<(&'static str, String)>,
  ) -> Self {
    match (err.violation(), unique) {
      (Some(Violation::DuplicateKey), _) => Self::DuplicateKey {
        table,
        key: key.to_owned(),
      },
      (Some(Violation::UniqueIndex), Some((index, value))) => {
        Self::UniqueConstraint { table, index, value }
      }
      _ => Self::Storage(Box::new(err)),
    }
  }

  /// Wrap a backend error that carries no constraint information.
  pub(crate) fn storage<E: StoreError>(err: E) -> Self {
    Self::Storage(Box::new(err))
  }

  /// True for the fatal, partially-applied import failure.
  pub fn is_import_interrupted(&self) -> bool {
    matches!(self, Self::ImportInterrupted { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
