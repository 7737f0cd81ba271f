//! SQLite-backed storage backend.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections and apply migrations.
//! - Store namespace documents in the `kv_store` table.
//!
//! # Invariants
//! - Returned storage has migrations fully applied.
//! - Every `set` is a single-statement upsert, so one namespace document is
//!   replaced atomically.

use super::migrations::apply_migrations;
use super::{StorageError, StoragePort, StorageResult};
use crate::util::lock;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Key/value storage persisted in one SQLite database.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) a database file and applies pending migrations.
    ///
    /// # Side effects
    /// - Creates missing parent directories.
    /// - Emits `storage_open` events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                StorageError::Unavailable(format!(
                    "cannot create storage directory `{}`: {err}",
                    parent.display()
                ))
            })?;
        }
        Self::bootstrap("file", || Connection::open(path))
    }

    /// Opens a private in-memory database with migrations applied.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::bootstrap("memory", Connection::open_in_memory)
    }

    fn bootstrap(
        mode: &'static str,
        connect: impl FnOnce() -> rusqlite::Result<Connection>,
    ) -> StorageResult<Self> {
        let started_at = Instant::now();
        info!("event=storage_open module=storage status=start mode={mode}");

        let result = connect()
            .map_err(StorageError::from)
            .and_then(|mut conn| configure_connection(&mut conn).map(|()| conn));

        match result {
            Ok(conn) => {
                info!(
                    "event=storage_open module=storage status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self {
                    conn: Mutex::new(conn),
                })
            }
            Err(err) => {
                error!(
                    "event=storage_open module=storage status=error mode={mode} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Returns the schema version recorded in `PRAGMA user_version`.
    pub fn schema_version(&self) -> StorageResult<u32> {
        let conn = lock(&self.conn);
        let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        Ok(version)
    }
}

impl StoragePort for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = lock(&self.conn);
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT INTO kv_store (namespace_key, value)
             VALUES (?1, ?2)
             ON CONFLICT(namespace_key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = lock(&self.conn);
        conn.execute("DELETE FROM kv_store WHERE namespace_key = ?1;", [key])?;
        Ok(())
    }
}

fn configure_connection(conn: &mut Connection) -> StorageResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
