//! Error type for `easystream-store-sqlite`.

use easystream_core::{
  record::Table,
  store::{StoreError, Violation},
};
use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Raised by `add` when the primary key is already present.
  #[error("{table} already contains key {key:?}")]
  DuplicateKey { table: Table, key: String },

  /// The file was written by a newer schema than this build understands.
  #[error("unsupported schema version {found} (newest known is {supported})")]
  SchemaVersion { found: i64, supported: i64 },
}

impl StoreError for Error {
  fn violation(&self) -> Option<Violation> {
    match self {
      Self::DuplicateKey { .. } => Some(Violation::DuplicateKey),
      Self::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(err, _),
      )) => match err.extended_code {
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Some(Violation::DuplicateKey),
        ffi::SQLITE_CONSTRAINT_UNIQUE => Some(Violation::UniqueIndex),
        _ => None,
      },
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
