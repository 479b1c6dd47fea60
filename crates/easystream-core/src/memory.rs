//! A process-local [`RecordStore`] kept in memory.
//!
//! Records are held as JSON documents, so every read deserialises a fresh,
//! independent copy exactly like a persistent backend would. Rows are kept in
//! primary-key order.

use std::{
  collections::{BTreeMap, HashMap},
  sync::Mutex,
};

use thiserror::Error;

use crate::{
  record::{Index, Record, Table},
  store::{RecordStore, StoreError, Violation},
};

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("{table} already contains key {key:?}")]
  DuplicateKey { table: Table, key: String },

  #[error("{table}.{index} already holds {value:?}")]
  UniqueIndex {
    table: Table,
    index: &'static str,
    value: String,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("memory store lock poisoned")]
  Poisoned,
}

impl StoreError for MemoryError {
  fn violation(&self) -> Option<Violation> {
    match self {
      Self::DuplicateKey { .. } => Some(Violation::DuplicateKey),
      Self::UniqueIndex { .. } => Some(Violation::UniqueIndex),
      _ => None,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Row {
  body:    serde_json::Value,
  indexes: HashMap<&'static str, String>,
}

#[derive(Debug, Default)]
struct TableData {
  rows: BTreeMap<String, Row>,
}

impl TableData {
  /// The unique index `row` would collide on, ignoring the row stored under
  /// `key` itself.
  fn unique_conflict<R: Record>(
    &self,
    key: &str,
    row: &Row,
  ) -> Option<(&'static str, String)> {
    R::Index::ALL
      .iter()
      .filter(|index| index.is_unique())
      .find_map(|index| {
        let name = index.name();
        let value = row.indexes.get(name)?;
        self
          .rows
          .iter()
          .any(|(k, other)| k != key && other.indexes.get(name) == Some(value))
          .then(|| (name, value.clone()))
      })
  }
}

/// An in-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<HashMap<Table, TableData>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn with_table<T>(
    &self,
    table: Table,
    f: impl FnOnce(&mut TableData) -> Result<T, MemoryError>,
  ) -> Result<T, MemoryError> {
    let mut tables = self.tables.lock().map_err(|_| MemoryError::Poisoned)?;
    f(tables.entry(table).or_default())
  }
}

fn encode<R: Record>(record: &R) -> Result<Row, MemoryError> {
  let indexes = R::Index::ALL
    .iter()
    .filter_map(|&index| record.index_value(index).map(|v| (index.name(), v)))
    .collect();
  Ok(Row { body: serde_json::to_value(record)?, indexes })
}

fn decode_all<R: Record>(
  bodies: Vec<serde_json::Value>,
) -> Result<Vec<R>, MemoryError> {
  bodies
    .into_iter()
    .map(|body| serde_json::from_value(body).map_err(MemoryError::from))
    .collect()
}

impl RecordStore for MemoryStore {
  type Error = MemoryError;

  async fn add<R: Record>(&self, record: R) -> Result<(), MemoryError> {
    let key = record.key().to_owned();
    let row = encode(&record)?;

    self.with_table(R::TABLE, |t| {
      if t.rows.contains_key(&key) {
        return Err(MemoryError::DuplicateKey { table: R::TABLE, key });
      }
      if let Some((index, value)) = t.unique_conflict::<R>(&key, &row) {
        return Err(MemoryError::UniqueIndex { table: R::TABLE, index, value });
      }
      t.rows.insert(key, row);
      Ok(())
    })
  }

  async fn get<'a, R: Record>(
    &'a self,
    key: &'a str,
  ) -> Result<Option<R>, MemoryError> {
    let body = self.with_table(R::TABLE, |t| {
      Ok(t.rows.get(key).map(|row| row.body.clone()))
    })?;
    body
      .map(|b| serde_json::from_value(b).map_err(MemoryError::from))
      .transpose()
  }

  async fn get_all<R: Record>(&self) -> Result<Vec<R>, MemoryError> {
    let bodies = self.with_table(R::TABLE, |t| {
      Ok(t.rows.values().map(|row| row.body.clone()).collect())
    })?;
    decode_all(bodies)
  }

  async fn update<R: Record>(&self, record: R) -> Result<(), MemoryError> {
    let key = record.key().to_owned();
    let row = encode(&record)?;

    self.with_table(R::TABLE, |t| {
      if let Some((index, value)) = t.unique_conflict::<R>(&key, &row) {
        return Err(MemoryError::UniqueIndex { table: R::TABLE, index, value });
      }
      t.rows.insert(key, row);
      Ok(())
    })
  }

  async fn delete<'a, R: Record>(
    &'a self,
    key: &'a str,
  ) -> Result<bool, MemoryError> {
    self.with_table(R::TABLE, |t| {
      t.rows.remove(key);
      Ok(true)
    })
  }

  async fn query_by_index<'a, R: Record>(
    &'a self,
    index: R::Index,
    value: &'a str,
  ) -> Result<Vec<R>, MemoryError> {
    let name = index.name();
    let bodies = self.with_table(R::TABLE, |t| {
      Ok(
        t.rows
          .values()
          .filter(|row| row.indexes.get(name).map(String::as_str) == Some(value))
          .map(|row| row.body.clone())
          .collect(),
      )
    })?;
    decode_all(bodies)
  }

  async fn clear<R: Record>(&self) -> Result<(), MemoryError> {
    self.with_table(R::TABLE, |t| {
      t.rows.clear();
      Ok(())
    })
  }
}
