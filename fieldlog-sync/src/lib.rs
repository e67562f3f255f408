//! Sync reconciler for fieldlog.
//!
//! Produces a single consistent view from two divergent sources of truth,
//! and pushes the local backlog toward the remote ledger.
//!
//! ## Merge-for-read
//!
//! The remote ledger is authoritative for anything it has accepted, so a
//! merged listing carries every remote record first and appends the local
//! records still pending — de-duplicated by identity. A failed remote fetch
//! degrades the view to local-only instead of failing the read.
//!
//! ## Drain-for-write
//!
//! The pending-write queue (the store's unsynced scan) is snapshotted once
//! and replayed against the ledger strictly one record at a time; the
//! endpoint's correlation bookkeeping cannot cope with overlapping calls.
//! Each acknowledged record is removed from the local store; each failed
//! one stays queued for the next drain. There is no retry bound, backoff,
//! or dead-letter queue — a record that keeps failing keeps being retried.

mod merge;
mod reconciler;

pub use merge::merge_view;
pub use reconciler::{DrainConfig, DrainReport, DrainStatus, RecordOutcome, Reconciler};
