//! SQL schema for the EasyStream SQLite store.
//!
//! Every table keeps the full record as JSON in `body`, next to one column
//! per secondary index. The index columns are written from the record on
//! every insert and upsert and are never read back as data.

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS clients (
    key        TEXT PRIMARY KEY,
    whats_app  TEXT,
    name       TEXT,
    status     TEXT,            -- 'active' | 'inactive'
    body       TEXT NOT NULL
);

-- client_id is deliberately not a foreign key: orphaned purchases are legal.
CREATE TABLE IF NOT EXISTS purchases (
    key            TEXT PRIMARY KEY,
    client_id      TEXT,
    service_code   TEXT,
    status         TEXT,
    expiry_date    TEXT,        -- ISO 8601 calendar date
    purchase_date  TEXT,        -- ISO 8601 calendar date
    body           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS services (
    key   TEXT PRIMARY KEY,
    code  TEXT UNIQUE,
    body  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    body  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS clients_whats_app_idx      ON clients(whats_app);
CREATE INDEX IF NOT EXISTS clients_name_idx           ON clients(name);
CREATE INDEX IF NOT EXISTS clients_status_idx         ON clients(status);
CREATE INDEX IF NOT EXISTS purchases_client_idx       ON purchases(client_id);
CREATE INDEX IF NOT EXISTS purchases_service_code_idx ON purchases(service_code);
CREATE INDEX IF NOT EXISTS purchases_status_idx       ON purchases(status);
CREATE INDEX IF NOT EXISTS purchases_expiry_idx       ON purchases(expiry_date);
CREATE INDEX IF NOT EXISTS purchases_date_idx         ON purchases(purchase_date);

PRAGMA user_version = 1;
";
