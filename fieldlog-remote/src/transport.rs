//! Transport layer abstraction.
//!
//! A transport carries an encoded request toward the endpoint and resolves
//! the request's correlation token through a [`ResponseSink`] once the reply
//! (or a transport-level failure) comes back — possibly after `dispatch` has
//! returned. The client races that resolution against its deadline; a token
//! that has already been resolved or deregistered swallows any further
//! deliveries.

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{CorrelationToken, RemoteRequest, RemoteResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// What a transport hands back for one dispatched request.
pub type TransportReply = Result<RemoteResponse, RemoteError>;

pub(crate) type Registry = Mutex<HashMap<CorrelationToken, oneshot::Sender<TransportReply>>>;

/// Write half of the client's correlation registry. Cloneable so a
/// transport can move it into whatever task eventually sees the reply.
#[derive(Clone)]
pub struct ResponseSink {
    registry: Arc<Registry>,
}

impl ResponseSink {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Resolves a pending call, deregistering its token. Returns `false`
    /// when the token is no longer registered (the call already resolved or
    /// timed out); such late or duplicate deliveries are dropped.
    pub fn resolve(&self, token: CorrelationToken, reply: TransportReply) -> bool {
        match self.registry.lock().unwrap().remove(&token) {
            Some(slot) => slot.send(reply).is_ok(),
            None => false,
        }
    }
}

/// Carries requests to the remote ledger endpoint.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Dispatches one request. The transport must resolve `sink` with the
    /// request's token exactly once — unless dispatch itself fails, in which
    /// case the error return stands in for the resolution.
    async fn dispatch(&self, request: RemoteRequest, sink: ResponseSink) -> RemoteResult<()>;
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;

    /// How the mock answers one dispatched request.
    pub enum MockReply {
        /// Resolve with the given response.
        Respond(RemoteResponse),
        /// Resolve as a transport failure.
        Fail(String),
        /// Do not resolve; the request is parked so the test can resolve it
        /// later (or let the caller's deadline fire).
        Silence,
    }

    /// Transport that replays a scripted sequence of replies and records
    /// every request it sees.
    #[derive(Default)]
    pub struct MockTransport {
        script: Mutex<VecDeque<MockReply>>,
        requests: Mutex<Vec<RemoteRequest>>,
        parked: Mutex<VecDeque<(CorrelationToken, ResponseSink)>>,
    }

    impl MockTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the reply for the next dispatched request.
        pub fn push(&self, reply: MockReply) {
            self.script.lock().unwrap().push_back(reply);
        }

        /// Queues the same successful acknowledgment `n` times.
        pub fn push_ok(&self, n: usize) {
            for _ in 0..n {
                self.push(MockReply::Respond(RemoteResponse::ok()));
            }
        }

        /// Every request dispatched so far.
        pub fn requests(&self) -> Vec<RemoteRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Takes the oldest parked request (one dispatched under
        /// [`MockReply::Silence`]).
        pub fn take_parked(&self) -> Option<(CorrelationToken, ResponseSink)> {
            self.parked.lock().unwrap().pop_front()
        }

        /// Resolves the oldest parked request. Returns `false` when nothing
        /// is parked or the call is no longer waiting.
        pub fn resolve_parked(&self, reply: TransportReply) -> bool {
            match self.take_parked() {
                Some((token, sink)) => sink.resolve(token, reply),
                None => false,
            }
        }
    }

    #[async_trait]
    impl RemoteTransport for MockTransport {
        async fn dispatch(&self, request: RemoteRequest, sink: ResponseSink) -> RemoteResult<()> {
            let token = request.token;
            self.requests.lock().unwrap().push(request);

            let reply = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| MockReply::Fail("no scripted reply".into()));

            match reply {
                MockReply::Respond(response) => {
                    sink.resolve(token, Ok(response));
                }
                MockReply::Fail(message) => {
                    sink.resolve(token, Err(RemoteError::Transport(message)));
                }
                MockReply::Silence => {
                    self.parked.lock().unwrap().push_back((token, sink));
                }
            }
            Ok(())
        }
    }
}
