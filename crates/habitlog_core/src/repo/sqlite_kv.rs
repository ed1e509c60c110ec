//! SQLite file backing for the key-value contract.
//!
//! # Invariants
//! - The `kv_store` table exists before a store value is handed out.
//! - `PRAGMA user_version` records the layout; files written by a newer
//!   layout are refused instead of being rewritten.

use super::kv_store::{KeyValueStore, KvError, KvResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Table layout version this build reads and writes.
pub const KV_SCHEMA_VERSION: u32 = 1;

const CREATE_KV_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Key-value store kept in one SQLite table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens a database file, creating the table on first use.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let conn = connect("file", || Connection::open(path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> KvResult<Self> {
        let conn = connect("memory", Connection::open_in_memory)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn connect(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> KvResult<Connection> {
    let started_at = Instant::now();
    let result = open()
        .map_err(KvError::from)
        .and_then(|mut conn| ensure_schema(&mut conn).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=kv_open module=repo status=ok mode={mode} schema={KV_SCHEMA_VERSION} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=kv_open module=repo status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn ensure_schema(conn: &mut Connection) -> KvResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > KV_SCHEMA_VERSION {
        return Err(KvError::SchemaTooNew {
            found,
            supported: KV_SCHEMA_VERSION,
        });
    }
    if found < KV_SCHEMA_VERSION {
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_KV_TABLE)?;
        tx.pragma_update(None, "user_version", KV_SCHEMA_VERSION)?;
        tx.commit()?;
    }
    Ok(())
}
