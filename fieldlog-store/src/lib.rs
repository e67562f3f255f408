//! SQLite storage layer for fieldlog.
//!
//! Provides the on-device durable store for field records. Each module
//! (entity type) is a logical collection inside a single database file,
//! indexed by identity and by sync flag.
//!
//! # Architecture
//!
//! - Records are stored as JSON field maps with store-side bookkeeping
//!   columns (identity, module, creation stamp, sync flag)
//! - The pending-write queue is the sync-flag index over this table; it is
//!   derived by a filtered scan, never maintained as a separate structure
//! - `open` is idempotent and must complete before any mutation

mod error;
mod record_store;

pub use error::{StoreError, StoreResult};
pub use record_store::RecordStore;
