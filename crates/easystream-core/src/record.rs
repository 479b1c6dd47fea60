//! The binding between Rust record types and the four persistent tables.
//!
//! Every table stores one record type, addressed by a string primary key and
//! described by a closed set of secondary indexes. Because both the table and
//! its indexes are types rather than strings, a misspelt table or index name
//! does not compile.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// One of the four independent tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
  Clients,
  Purchases,
  Services,
  Settings,
}

impl Table {
  pub const ALL: [Table; 4] =
    [Table::Clients, Table::Purchases, Table::Services, Table::Settings];

  /// The physical table name.
  pub fn name(self) -> &'static str {
    match self {
      Self::Clients => "clients",
      Self::Purchases => "purchases",
      Self::Services => "services",
      Self::Settings => "settings",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Indexes ─────────────────────────────────────────────────────────────────

/// A secondary index declared on a table.
pub trait Index: Copy + fmt::Debug + Send + Sync + 'static {
  /// Every index declared for the table, in declaration order.
  const ALL: &'static [Self];

  /// The record field the index covers, as it appears in serialised records.
  fn name(self) -> &'static str;

  /// Column name used by relational backends.
  fn column(self) -> &'static str;

  /// Unique indexes reject a second record carrying the same value.
  fn is_unique(self) -> bool { false }
}

/// Index type for tables without secondary indexes.
#[derive(Debug, Clone, Copy)]
pub enum NoIndex {}

impl Index for NoIndex {
  const ALL: &'static [Self] = &[];

  fn name(self) -> &'static str { match self {} }

  fn column(self) -> &'static str { match self {} }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A value stored in exactly one [`Table`].
pub trait Record:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const TABLE: Table;
  type Index: Index;

  /// The primary key.
  fn key(&self) -> &str;

  /// The value this record contributes to `index`, or `None` when the field
  /// is absent (absent values never match a lookup).
  fn index_value(&self, index: Self::Index) -> Option<String>;
}

/// The name and value of the record's unique index, if its table has one.
pub fn unique_entry<R: Record>(record: &R) -> Option<(&'static str, String)> {
  R::Index::ALL
    .iter()
    .copied()
    .find(|index| index.is_unique())
    .and_then(|index| record.index_value(index).map(|v| (index.name(), v)))
}
