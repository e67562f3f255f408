//! Remote ledger client for fieldlog.
//!
//! The remote store is reachable only through a narrow asynchronous RPC
//! channel: one logical call at a time, correlated by token, bounded by a
//! hard deadline.
//!
//! # Architecture
//!
//! - **Protocol**: the query-string wire contract shared with the legacy
//!   endpoint (`accion`/`modulo`/`id`/`datos`/`callback`)
//! - **Client**: [`LedgerClient`] issues calls, races each against its
//!   deadline, and keeps the token-keyed registry of pending responses
//! - **Transport**: abstracts how an encoded request reaches the endpoint;
//!   an HTTP implementation ships here, a scripted mock lives in
//!   [`mock`] for tests
//! - **Connectivity**: a non-blocking reachability probe consulted before
//!   every call — an unreachable endpoint fails immediately instead of
//!   burning the timeout
//!
//! Failure semantics: a reply without the explicit success indicator is
//! reported as [`RemoteError::Rejected`], but callers recover from it
//! exactly as they do from [`RemoteError::Transport`] and
//! [`RemoteError::Timeout`] — by falling back to the local store.

mod client;
mod connectivity;
mod error;
mod http;
mod protocol;
mod transport;

pub use client::{LedgerClient, RemoteConfig};
pub use connectivity::{AlwaysOnline, ConnectivityProbe, SharedProbe};
pub use error::{RemoteError, RemoteResult};
pub use http::HttpTransport;
pub use protocol::{Action, CorrelationToken, RemoteRecord, RemoteRequest, RemoteResponse};
pub use transport::{mock, RemoteTransport, ResponseSink, TransportReply};
