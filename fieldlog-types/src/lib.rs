//! Core type definitions for fieldlog.
//!
//! This crate defines the types shared by the record store, the remote
//! ledger client, and the reconciler:
//! - Record identities (assigned locally by the store or supplied by the
//!   remote ledger)
//! - The `Record` unit of storage with its sync flag
//!
//! Entity-type-specific field layouts (which fields a machinery or
//! maintenance entry requires) belong to the gateway's module schemas,
//! not here.

mod ids;
mod record;

pub use ids::RecordId;
pub use record::{FieldMap, Record, SyncState};
