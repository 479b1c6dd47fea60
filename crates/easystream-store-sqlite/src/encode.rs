//! Encoding between [`Record`] values and SQLite rows, and the SQL text for
//! each statement shape.
//!
//! Table and column names come from [`Record::TABLE`] and
//! [`Index::column`], never from caller input, so formatting them into SQL is
//! safe.

use easystream_core::record::{Index, Record};

use crate::Result;

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A record flattened into bindable column values.
pub struct EncodedRow {
  pub key:     String,
  /// One value per entry of `R::Index::ALL`, in that order.
  pub indexes: Vec<Option<String>>,
  pub body:    String,
}

impl EncodedRow {
  /// Parameters in the order expected by [`insert_sql`] and [`upsert_sql`].
  pub fn into_params(self) -> Vec<Option<String>> {
    let mut params = Vec::with_capacity(self.indexes.len() + 2);
    params.push(Some(self.key));
    params.extend(self.indexes);
    params.push(Some(self.body));
    params
  }
}

pub fn encode<R: Record>(record: &R) -> Result<EncodedRow> {
  Ok(EncodedRow {
    key:     record.key().to_owned(),
    indexes: R::Index::ALL
      .iter()
      .map(|&index| record.index_value(index))
      .collect(),
    body:    serde_json::to_string(record)?,
  })
}

pub fn decode<R: Record>(body: &str) -> Result<R> { Ok(serde_json::from_str(body)?) }

pub fn decode_all<R: Record>(bodies: Vec<String>) -> Result<Vec<R>> {
  bodies.iter().map(|b| decode(b)).collect()
}

// ─── SQL ─────────────────────────────────────────────────────────────────────

fn columns<R: Record>() -> Vec<&'static str> {
  let mut cols = vec!["key"];
  cols.extend(R::Index::ALL.iter().map(|index| index.column()));
  cols.push("body");
  cols
}

pub fn insert_sql<R: Record>() -> String {
  let cols = columns::<R>();
  let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    R::TABLE.name(),
    cols.join(", "),
    placeholders.join(", ")
  )
}

/// Insert-or-update by primary key. Unlike `INSERT OR REPLACE`, a collision
/// on a unique index still fails instead of deleting the other row.
pub fn upsert_sql<R: Record>() -> String {
  let assignments: Vec<String> = columns::<R>()
    .into_iter()
    .skip(1)
    .map(|col| format!("{col} = excluded.{col}"))
    .collect();
  format!(
    "{} ON CONFLICT(key) DO UPDATE SET {}",
    insert_sql::<R>(),
    assignments.join(", ")
  )
}

pub fn exists_sql<R: Record>() -> String {
  format!("SELECT 1 FROM {} WHERE key = ?1", R::TABLE.name())
}

pub fn select_one_sql<R: Record>() -> String {
  format!("SELECT body FROM {} WHERE key = ?1", R::TABLE.name())
}

pub fn select_all_sql<R: Record>() -> String {
  format!("SELECT body FROM {} ORDER BY rowid", R::TABLE.name())
}

pub fn select_by_index_sql<R: Record>(index: R::Index) -> String {
  format!(
    "SELECT body FROM {} WHERE {} = ?1 ORDER BY rowid",
    R::TABLE.name(),
    index.column()
  )
}

pub fn delete_sql<R: Record>() -> String {
  format!("DELETE FROM {} WHERE key = ?1", R::TABLE.name())
}

pub fn clear_sql<R: Record>() -> String { format!("DELETE FROM {}", R::TABLE.name()) }

#[cfg(test)]
mod tests {
  use easystream_core::{service::Service, setting::Setting};

  use super::*;

  #[test]
  fn upsert_keeps_unique_indexes_enforced() {
    assert_eq!(
      upsert_sql::<Service>(),
      "INSERT INTO services (key, code, body) VALUES (?1, ?2, ?3) \
       ON CONFLICT(key) DO UPDATE SET code = excluded.code, body = excluded.body"
    );
  }

  #[test]
  fn tables_without_indexes_have_two_columns() {
    assert_eq!(
      insert_sql::<Setting>(),
      "INSERT INTO settings (key, body) VALUES (?1, ?2)"
    );
  }
}
