//! The remote ledger client.
//!
//! Each call registers a one-shot response slot under a fresh correlation
//! token, hands the encoded request to the transport, and races the slot
//! against a hard deadline. Whichever arm fires, the token is deregistered
//! exactly once: the resolve path removes it when the reply lands, and the
//! post-race sweep removes it when the deadline won. A late reply finds no
//! slot and is dropped.

use crate::connectivity::ConnectivityProbe;
use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{Action, CorrelationToken, RemoteRecord, RemoteRequest, RemoteResponse};
use crate::transport::{Registry, RemoteTransport, ResponseSink};
use fieldlog_types::{FieldMap, RecordId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Configuration for the ledger client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Hard deadline for every call.
    pub call_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(8),
        }
    }
}

/// Issues one logical RPC at a time against the remote ledger endpoint.
pub struct LedgerClient {
    transport: Arc<dyn RemoteTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
    registry: Arc<Registry>,
    config: RemoteConfig,
}

impl LedgerClient {
    /// Creates a client with the default configuration.
    pub fn new(transport: Arc<dyn RemoteTransport>, connectivity: Arc<dyn ConnectivityProbe>) -> Self {
        Self::with_config(transport, connectivity, RemoteConfig::default())
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(
        transport: Arc<dyn RemoteTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        config: RemoteConfig,
    ) -> Self {
        Self {
            transport,
            connectivity,
            registry: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Whether the connectivity probe currently reports the endpoint
    /// reachable.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.connectivity.is_reachable()
    }

    /// Number of calls still awaiting a response.
    #[must_use]
    pub fn pending_calls(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    /// Issues one call against the endpoint.
    ///
    /// Skipped outright (no timeout wait) when the connectivity probe
    /// reports unreachable. A reply without the explicit success indicator
    /// resolves as [`RemoteError::Rejected`]; callers recover from it the
    /// same way as from any transport failure.
    pub async fn call(
        &self,
        action: Action,
        module: &str,
        payload: Option<FieldMap>,
        id: Option<RecordId>,
    ) -> RemoteResult<RemoteResponse> {
        if !self.connectivity.is_reachable() {
            debug!(module, %action, "endpoint unreachable, call skipped");
            return Err(RemoteError::Transport("endpoint unreachable".into()));
        }

        let token = CorrelationToken::new();
        let (slot, reply_rx) = oneshot::channel();
        self.registry.lock().unwrap().insert(token, slot);

        let request = RemoteRequest {
            action,
            module: module.to_string(),
            id,
            payload,
            token,
        };
        debug!(module, %action, %token, "dispatching remote call");

        let sink = ResponseSink::new(self.registry.clone());
        if let Err(err) = self.transport.dispatch(request, sink).await {
            self.deregister(token);
            return Err(err);
        }

        let raced = tokio::time::timeout(self.config.call_timeout, reply_rx).await;
        // No-op when the resolve path already cleaned up; removes the slot
        // when the deadline won the race.
        self.deregister(token);

        match raced {
            Err(_elapsed) => {
                warn!(module, %action, %token, "remote call timed out");
                Err(RemoteError::Timeout)
            }
            Ok(Err(_dropped)) => Err(RemoteError::Transport("response slot dropped".into())),
            Ok(Ok(Err(err))) => Err(err),
            Ok(Ok(Ok(response))) if response.success => Ok(response),
            Ok(Ok(Ok(_))) => {
                debug!(module, %action, "remote ledger answered without success");
                Err(RemoteError::Rejected)
            }
        }
    }

    fn deregister(&self, token: CorrelationToken) {
        self.registry.lock().unwrap().remove(&token);
    }

    // ── Convenience wrappers ─────────────────────────────────────

    /// Creates a record remotely.
    pub async fn create(&self, module: &str, fields: FieldMap) -> RemoteResult<RemoteResponse> {
        self.call(Action::Create, module, Some(fields), None).await
    }

    /// Updates a record remotely.
    pub async fn update(
        &self,
        module: &str,
        id: RecordId,
        fields: FieldMap,
    ) -> RemoteResult<RemoteResponse> {
        self.call(Action::Update, module, Some(fields), Some(id)).await
    }

    /// Deletes a record remotely.
    pub async fn delete(&self, module: &str, id: RecordId) -> RemoteResult<RemoteResponse> {
        self.call(Action::Delete, module, None, Some(id)).await
    }

    /// Fetches the remote listing for a module.
    pub async fn list(&self, module: &str) -> RemoteResult<Vec<RemoteRecord>> {
        self.call(Action::List, module, None, None)
            .await
            .map(RemoteResponse::into_records)
    }
}
