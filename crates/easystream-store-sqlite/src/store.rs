//! The SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use easystream_core::{
  record::{Index as _, Record},
  store::RecordStore,
};

use crate::{
  Error, Result,
  encode::{
    clear_sql, decode, decode_all, delete_sql, encode, exists_sql, insert_sql,
    select_all_sql, select_by_index_sql, select_one_sql, upsert_sql,
  },
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An EasyStream record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Flush and close the connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// The schema version recorded in the database file.
  pub async fn schema_version(&self) -> Result<i64> {
    let version = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }

  async fn init_schema(&self) -> Result<()> {
    let found = self.schema_version().await?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(from = found, to = SCHEMA_VERSION, "schema initialised");
    Ok(())
  }

  async fn bodies(&self, sql: String, param: Option<String>) -> Result<Vec<String>> {
    let bodies = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(bodies)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn add<R: Record>(&self, record: R) -> Result<()> {
    let row = encode(&record)?;
    let key = row.key.clone();
    let exists = exists_sql::<R>();
    let insert = insert_sql::<R>();
    let params = row.into_params();

    // The existence check and the insert run in one call, so nothing can
    // interleave between them.
    let inserted = self
      .conn
      .call(move |conn| {
        let present = conn
          .query_row(&exists, [&params[0]], |_| Ok(()))
          .optional()?
          .is_some();
        if present {
          return Ok(false);
        }
        conn.execute(&insert, rusqlite::params_from_iter(params.iter()))?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateKey { table: R::TABLE, key });
    }
    Ok(())
  }

  async fn get<'a, R: Record>(&'a self, key: &'a str) -> Result<Option<R>> {
    let sql = select_one_sql::<R>();
    let key = key.to_owned();

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, [key], |row| row.get(0)).optional()?)
      })
      .await?;

    body.as_deref().map(decode).transpose()
  }

  async fn get_all<R: Record>(&self) -> Result<Vec<R>> {
    let bodies = self.bodies(select_all_sql::<R>(), None).await?;
    decode_all(bodies)
  }

  async fn update<R: Record>(&self, record: R) -> Result<()> {
    let sql = upsert_sql::<R>();
    let params = encode(&record)?.into_params();

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete<'a, R: Record>(&'a self, key: &'a str) -> Result<bool> {
    let sql = delete_sql::<R>();
    let key = key.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, [key])?;
        Ok(())
      })
      .await?;
    Ok(true)
  }

  async fn query_by_index<'a, R: Record>(
    &'a self,
    index: R::Index,
    value: &'a str,
  ) -> Result<Vec<R>> {
    debug!(table = %R::TABLE, index = index.name(), value, "index lookup");
    let bodies = self
      .bodies(select_by_index_sql::<R>(index), Some(value.to_owned()))
      .await?;
    decode_all(bodies)
  }

  async fn clear<R: Record>(&self) -> Result<()> {
    let sql = clear_sql::<R>();
    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
