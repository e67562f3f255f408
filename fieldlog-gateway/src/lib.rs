//! Per-module gateway for fieldlog.
//!
//! The gateway is the write and read surface a UI talks to. Each instance
//! is scoped to one module (entity type) and routes every write remote-first
//! with a local fallback:
//!
//! 1. Validation — required fields present and non-empty — rejects bad
//!    input synchronously, before any store or network interaction.
//! 2. If the connectivity probe says reachable, the write is attempted
//!    against the remote ledger. The attempt always finishes (success,
//!    failure, or timeout) before any fallback starts.
//! 3. A failed or skipped remote attempt lands the write in the local
//!    store, queued for a later drain. Only a local-store failure is a
//!    terminal error — at that point the write cannot be preserved at all.
//!
//! A successful remote write also triggers a background drain: connectivity
//! was just confirmed, so any older backlog can flush now.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fieldlog_gateway::{ModuleGateway, ModuleSchema};
//! use fieldlog_remote::{mock::MockTransport, AlwaysOnline, LedgerClient};
//! use fieldlog_store::RecordStore;
//! use fieldlog_sync::Reconciler;
//!
//! let store = Arc::new(RecordStore::in_memory());
//! store.open().unwrap();
//! let probe = Arc::new(AlwaysOnline);
//! let remote = Arc::new(LedgerClient::new(Arc::new(MockTransport::new()), probe.clone()));
//! let reconciler = Arc::new(Reconciler::new(store.clone(), remote.clone()));
//! let gateway = ModuleGateway::new(ModuleSchema::machinery(), store, remote, reconciler, probe);
//! assert_eq!(gateway.module(), "machinery");
//! ```

mod gateway;
mod schema;

pub use gateway::{GatewayError, GatewayResult, ModuleGateway, WriteOutcome};
pub use schema::{ModuleSchema, ValidationError};
