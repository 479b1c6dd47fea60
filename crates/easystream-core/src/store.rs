//! The `RecordStore` trait: generic keyed persistence for [`Record`] types.
//!
//! The trait is implemented by storage backends ([`crate::memory::MemoryStore`]
//! here, `easystream-store-sqlite` for durable storage). Repositories and the
//! [`crate::panel::Panel`] depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::record::Record;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The constraint a failed write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  /// The primary key already exists.
  DuplicateKey,
  /// A unique secondary index already holds the value.
  UniqueIndex,
}

/// Error type produced by a backend.
///
/// Anything that is not a constraint violation is treated as a storage fault
/// and propagated unchanged.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn violation(&self) -> Option<Violation>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Keyed storage of independent tables.
///
/// Each method is a single atomic unit against one table. There is no
/// cross-table transaction; higher layers compose calls and handle partial
/// failure themselves.
///
/// Every read returns an independent copy of the stored record.
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  /// Insert a new record. Fails with [`Violation::DuplicateKey`] if the key
  /// exists, or [`Violation::UniqueIndex`] if a unique index collides.
  fn add<R: Record>(
    &self,
    record: R,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a record by primary key. A missing key is `Ok(None)`.
  fn get<'a, R: Record>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + 'a;

  /// Every record in the table. Order is backend-defined.
  fn get_all<R: Record>(
    &self,
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + '_;

  /// Insert or replace by primary key. Unique indexes are still enforced.
  fn update<R: Record>(
    &self,
    record: R,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove by primary key. Reports `true` whether or not the key existed.
  fn delete<'a, R: Record>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every record whose `index` value equals `value`.
  fn query_by_index<'a, R: Record>(
    &'a self,
    index: R::Index,
    value: &'a str,
  ) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + 'a;

  /// Remove every record from the table.
  fn clear<R: Record>(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
