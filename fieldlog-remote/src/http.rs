//! HTTP transport for the remote ledger endpoint.
//!
//! Encodes each request onto the endpoint URL as a query string and parses
//! the reply body, tolerating the JSONP padding (`token({...})`) the legacy
//! endpoint wraps around its JSON payload.

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{CorrelationToken, RemoteRequest, RemoteResponse};
use crate::transport::{RemoteTransport, ResponseSink, TransportReply};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Transport that reaches the endpoint over HTTP GET.
pub struct HttpTransport {
    endpoint: String,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint URL. The HTTP-level
    /// timeout is only a backstop; the logical deadline belongs to the
    /// ledger client.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    fn request_url(&self, request: &RemoteRequest) -> RemoteResult<String> {
        Ok(format!("{}?{}", self.endpoint, request.query_string()?))
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn dispatch(&self, request: RemoteRequest, sink: ResponseSink) -> RemoteResult<()> {
        let url = self.request_url(&request)?;
        let client = self.client.clone();
        let token = request.token;

        // The reply resolves through the sink from its own task, so a slow
        // endpoint never holds up dispatch; the client's deadline governs.
        tokio::spawn(async move {
            let reply = fetch(&client, &url, token).await;
            if !sink.resolve(token, reply) {
                debug!(%token, "reply arrived after resolution, dropped");
            }
        });
        Ok(())
    }
}

async fn fetch(client: &Client, url: &str, token: CorrelationToken) -> TransportReply {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RemoteError::Transport(e.to_string()))?;
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::Transport(e.to_string()))?;
    parse_reply(&body, token)
}

/// Parses a reply body. Any shape that does not decode into the expected
/// payload counts as a transport failure.
fn parse_reply(body: &str, token: CorrelationToken) -> TransportReply {
    let trimmed = body.trim();
    let json = strip_padding(trimmed, token).unwrap_or(trimmed);
    serde_json::from_str::<RemoteResponse>(json)
        .map_err(|e| RemoteError::Transport(format!("malformed reply: {e}")))
}

/// Peels `token( ... )` off a JSONP-padded body, if that is what arrived.
fn strip_padding(body: &str, token: CorrelationToken) -> Option<&str> {
    let rest = body.strip_prefix(&token.to_string())?.trim_start();
    let inner = rest.strip_prefix('(')?.trim_end();
    let inner = inner.strip_suffix(';').unwrap_or(inner).trim_end();
    Some(inner.strip_suffix(')')?.trim())
}
