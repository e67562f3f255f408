//! Wire protocol for the remote ledger endpoint.
//!
//! The endpoint is a single HTTP-style URL parameterized by query string,
//! kept compatible with the legacy backend: `accion` selects the operation,
//! `modulo` names the collection, `id` and `datos` carry the optional
//! identity and JSON-encoded field map, and `callback` carries the
//! correlation token the reply is addressed to. Replies carry an explicit
//! `success` flag plus a listing under `registros` (or the legacy
//! `maquinarias` key the machinery module still uses).

use crate::error::RemoteResult;
use fieldlog_types::{FieldMap, Record, RecordId, SyncState};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The four logical operations the endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    List,
}

impl Action {
    /// The value sent in the `accion` query parameter.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Create => "registrar",
            Self::Update => "editar",
            Self::Delete => "eliminar",
            Self::List => "listar",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Per-call unique identifier matching an asynchronous reply to the request
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    /// Generates a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One encoded request against the endpoint.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub action: Action,
    pub module: String,
    pub id: Option<RecordId>,
    pub payload: Option<FieldMap>,
    pub token: CorrelationToken,
}

impl RemoteRequest {
    /// The query parameters in wire order. Values are not yet URL-encoded.
    pub fn query_pairs(&self) -> RemoteResult<Vec<(&'static str, String)>> {
        let mut pairs = vec![
            ("accion", self.action.wire_name().to_string()),
            ("modulo", self.module.clone()),
        ];
        if let Some(id) = self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(payload) = &self.payload {
            pairs.push(("datos", serde_json::to_string(payload)?));
        }
        pairs.push(("callback", self.token.to_string()));
        Ok(pairs)
    }

    /// The URL-encoded query string.
    pub fn query_string(&self) -> RemoteResult<String> {
        let pairs = self.query_pairs()?;
        let encoded: Vec<String> = pairs
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect();
        Ok(encoded.join("&"))
    }
}

/// The reply payload the endpoint hands to the named callback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// Explicit success indicator. Anything short of `true` is treated like
    /// a transport failure by callers.
    #[serde(default)]
    pub success: bool,

    /// Listing returned by `listar`.
    #[serde(default, rename = "registros", skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RemoteRecord>>,

    /// Legacy listing key the machinery module responds with.
    #[serde(default, rename = "maquinarias", skip_serializing_if = "Option::is_none")]
    pub legacy_records: Option<Vec<RemoteRecord>>,
}

impl RemoteResponse {
    /// A bare acknowledgment.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A well-formed negative reply.
    #[must_use]
    pub fn failed() -> Self {
        Self::default()
    }

    /// A successful listing reply.
    #[must_use]
    pub fn with_records(records: Vec<RemoteRecord>) -> Self {
        Self {
            success: true,
            records: Some(records),
            legacy_records: None,
        }
    }

    /// The listing, whichever key it arrived under.
    #[must_use]
    pub fn into_records(self) -> Vec<RemoteRecord> {
        self.records.or(self.legacy_records).unwrap_or_default()
    }
}

/// One record as the endpoint reports it: an identity plus the
/// entity-specific fields at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(flatten)]
    pub fields: FieldMap,
}

impl RemoteRecord {
    /// Converts into the core record type. Remote-observed records carry no
    /// local persistence stamp and count as synced.
    #[must_use]
    pub fn into_record(self, module: &str) -> Record {
        Record {
            id: self.id,
            module: module.to_string(),
            fields: self.fields,
            created_at: None,
            sync_state: SyncState::Synced,
        }
    }
}
