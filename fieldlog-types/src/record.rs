//! The record — one stored entity instance.
//!
//! A record is a module-scoped field mapping plus bookkeeping: its identity,
//! when it was persisted, and whether the remote ledger has acknowledged it.
//! The sync flag is a local-only annotation; it never travels to the remote
//! store.

use crate::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered mapping of field name to JSON value. Contents are
/// entity-type-specific; the core treats them as opaque.
pub type FieldMap = serde_json::Map<String, Value>;

/// Whether a record has reached the remote ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Exists only in the local store; one pending write.
    Unsynced,
    /// Originated from, or was acknowledged by, the remote ledger.
    Synced,
}

impl SyncState {
    /// Converts from the boolean flag the store persists.
    #[must_use]
    pub const fn from_flag(synced: bool) -> Self {
        if synced { Self::Synced } else { Self::Unsynced }
    }

    /// The boolean flag the store persists.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::Synced)
    }

    #[must_use]
    pub const fn is_synced(self) -> bool {
        self.as_flag()
    }
}

/// One stored entity instance (a machine, a maintenance event, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identity within the module's collection. `None` until the store or
    /// the remote ledger has assigned one.
    pub id: Option<RecordId>,

    /// The module (entity type) this record belongs to.
    pub module: String,

    /// Entity-type-specific attributes.
    pub fields: FieldMap,

    /// Unix-millis persistence stamp set by the local store. Absent on
    /// records observed transiently through a remote listing.
    pub created_at: Option<i64>,

    /// Local-only sync annotation.
    pub sync_state: SyncState,
}

impl Record {
    /// Extracts a field as a string slice, if present and textual.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Whether this record still awaits remote acknowledgment.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.sync_state.is_synced()
    }
}
