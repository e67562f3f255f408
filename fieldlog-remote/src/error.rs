//! Error types for the remote client.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur when calling the remote ledger.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The deadline elapsed before the response handler fired.
    #[error("remote call timed out")]
    Timeout,

    /// The request never produced a usable response: endpoint unreachable,
    /// dispatch failure, or a malformed reply.
    #[error("transport error: {0}")]
    Transport(String),

    /// The endpoint answered without the explicit success indicator.
    /// Recovery is identical to a transport failure.
    #[error("remote ledger rejected the request")]
    Rejected,

    /// Serialization error while encoding the request payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
