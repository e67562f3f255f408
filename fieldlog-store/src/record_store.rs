//! The local durable store.
//!
//! All mutations run inside SQLite's own transaction handling on a single
//! connection, so a call's result is only delivered after the write is
//! durable. Identity assignment uses the auto-increment key, which means
//! identities also encode insertion order.

use crate::error::{StoreError, StoreResult};
use fieldlog_types::{FieldMap, Record, RecordId, SyncState};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

enum Location {
    Disk(PathBuf),
    Memory,
}

/// SQLite-backed record store. One logical collection per module, all
/// sharing the `records` table, indexed by module and by module + sync flag.
pub struct RecordStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl RecordStore {
    /// Creates an unopened store backed by a database file.
    /// Call [`RecordStore::open`] before any other operation.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::Disk(path.as_ref().to_path_buf()),
            conn: Mutex::new(None),
        }
    }

    /// Creates an unopened in-memory store (for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: Mutex::new(None),
        }
    }

    /// Opens the store and establishes the schema. Idempotent: once a call
    /// has succeeded, later calls are no-ops, and concurrent callers observe
    /// the same readiness.
    pub fn open(&self) -> StoreResult<()> {
        let mut guard = self.conn.lock().unwrap();
        if guard.is_some() {
            return Ok(());
        }
        let conn = match &self.location {
            Location::Disk(path) => Connection::open(path)?,
            Location::Memory => Connection::open_in_memory()?,
        };
        init_schema(&conn)?;
        *guard = Some(conn);
        debug!("record store opened");
        Ok(())
    }

    /// Whether `open` has completed successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.conn.lock().unwrap().is_some()
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self.conn.lock().unwrap();
        let conn = guard.as_ref().ok_or(StoreError::Unavailable)?;
        f(conn)
    }

    /// Persists a new record: assigns an identity, stamps the creation time
    /// and the unsynced flag, and returns the stored record.
    pub fn put(&self, module: &str, fields: &FieldMap) -> StoreResult<Record> {
        self.with_conn(|conn| {
            let json = serde_json::to_string(fields)?;
            let created_at = chrono::Utc::now().timestamp_millis();
            conn.execute(
                "INSERT INTO records (module, fields, created_at, synced) VALUES (?1, ?2, ?3, 0)",
                params![module, json, created_at],
            )?;
            let id = RecordId::from_i64(conn.last_insert_rowid());
            debug!(module, %id, "record stored");
            Ok(Record {
                id: Some(id),
                module: module.to_string(),
                fields: fields.clone(),
                created_at: Some(created_at),
                sync_state: SyncState::Unsynced,
            })
        })
    }

    /// Merges `fields` into an existing record (shallow field overwrite) and
    /// re-stamps it unsynced. Fails with [`StoreError::NotFound`] when no
    /// record with that identity exists in the module's collection.
    pub fn update(&self, module: &str, id: RecordId, fields: &FieldMap) -> StoreResult<Record> {
        self.with_conn(|conn| {
            let row: Option<(String, i64)> = conn
                .query_row(
                    "SELECT fields, created_at FROM records WHERE module = ?1 AND id = ?2",
                    params![module, id.as_i64()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((stored_json, created_at)) = row else {
                return Err(StoreError::NotFound(format!("{module}/{id}")));
            };

            let mut merged: FieldMap = serde_json::from_str(&stored_json)?;
            for (name, value) in fields {
                merged.insert(name.clone(), value.clone());
            }

            let json = serde_json::to_string(&merged)?;
            conn.execute(
                "UPDATE records SET fields = ?1, synced = 0 WHERE module = ?2 AND id = ?3",
                params![json, module, id.as_i64()],
            )?;
            debug!(module, %id, "record updated");
            Ok(Record {
                id: Some(id),
                module: module.to_string(),
                fields: merged,
                created_at: Some(created_at),
                sync_state: SyncState::Unsynced,
            })
        })
    }

    /// Removes a record. Idempotent: removing a missing identity is not an
    /// error, so cleanup after a sync can be retried safely.
    pub fn remove(&self, module: &str, id: RecordId) -> StoreResult<()> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM records WHERE module = ?1 AND id = ?2",
                params![module, id.as_i64()],
            )?;
            if affected > 0 {
                debug!(module, %id, "record removed");
            }
            Ok(())
        })
    }

    /// Full scan of a module's collection, in insertion order.
    pub fn list_all(&self, module: &str) -> StoreResult<Vec<Record>> {
        self.scan(module, false)
    }

    /// The pending-write queue: the same scan filtered to unsynced records.
    pub fn list_unsynced(&self, module: &str) -> StoreResult<Vec<Record>> {
        self.scan(module, true)
    }

    fn scan(&self, module: &str, unsynced_only: bool) -> StoreResult<Vec<Record>> {
        self.with_conn(|conn| {
            let sql = if unsynced_only {
                "SELECT id, fields, created_at, synced FROM records
                 WHERE module = ?1 AND synced = 0 ORDER BY id"
            } else {
                "SELECT id, fields, created_at, synced FROM records
                 WHERE module = ?1 ORDER BY id"
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params![module], |row| {
                let id: i64 = row.get(0)?;
                let json: String = row.get(1)?;
                let created_at: i64 = row.get(2)?;
                let synced: bool = row.get(3)?;
                Ok((id, json, created_at, synced))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (id, json, created_at, synced) = row?;
                records.push(Record {
                    id: Some(RecordId::from_i64(id)),
                    module: module.to_string(),
                    fields: serde_json::from_str(&json)?,
                    created_at: Some(created_at),
                    sync_state: SyncState::from_flag(synced),
                });
            }
            Ok(records)
        })
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module TEXT NOT NULL,
            fields TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_records_module ON records(module);
        CREATE INDEX IF NOT EXISTS idx_records_module_synced ON records(module, synced);
        ",
    )?;
    Ok(())
}
