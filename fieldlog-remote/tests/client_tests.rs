use fieldlog_remote::mock::{MockReply, MockTransport};
use fieldlog_remote::{
    Action, LedgerClient, RemoteConfig, RemoteError, RemoteRecord, RemoteResponse, SharedProbe,
};
use fieldlog_types::FieldMap;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn sample_fields() -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("name".into(), json!("Excavator"));
    fields
}

fn client_with(transport: Arc<MockTransport>, online: bool) -> LedgerClient {
    LedgerClient::new(transport, Arc::new(SharedProbe::new(online)))
}

// ── Resolution paths ─────────────────────────────────────────────

#[tokio::test]
async fn successful_reply_resolves_the_call() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Respond(RemoteResponse::ok()));
    let client = client_with(transport.clone(), true);

    let response = client.create("machinery", sample_fields()).await.unwrap();
    assert!(response.success);
    assert_eq!(transport.request_count(), 1);

    let request = &transport.requests()[0];
    assert_eq!(request.action, Action::Create);
    assert_eq!(request.module, "machinery");
    assert!(request.payload.is_some());
}

#[tokio::test]
async fn negative_reply_is_rejected() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Respond(RemoteResponse::failed()));
    let client = client_with(transport, true);

    let err = client.create("machinery", sample_fields()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Rejected));
}

#[tokio::test]
async fn transport_failure_propagates() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Fail("connection reset".into()));
    let client = client_with(transport, true);

    let err = client.delete("machinery", 4.into()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));
}

#[tokio::test]
async fn list_unwraps_the_records() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Respond(RemoteResponse::with_records(vec![
        RemoteRecord {
            id: Some(1.into()),
            fields: sample_fields(),
        },
    ])));
    let client = client_with(transport, true);

    let records = client.list("machinery").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, Some(1.into()));
}

// ── Reachability guard ───────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn offline_call_is_skipped_without_the_timeout_wait() {
    let transport = Arc::new(MockTransport::new());
    let client = client_with(transport.clone(), false);

    let before = Instant::now();
    let err = client.create("machinery", sample_fields()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)));

    assert_eq!(before.elapsed(), Duration::ZERO);
    assert_eq!(transport.request_count(), 0);
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn probe_recovery_reenables_calls() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Respond(RemoteResponse::ok()));
    let probe = Arc::new(SharedProbe::new(false));
    let client = LedgerClient::new(transport.clone(), probe.clone());

    assert!(client.create("machinery", sample_fields()).await.is_err());
    assert_eq!(transport.request_count(), 0);

    probe.set_online(true);
    assert!(client.create("machinery", sample_fields()).await.is_ok());
    assert_eq!(transport.request_count(), 1);
}

// ── Deadline ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn silent_endpoint_times_out_at_the_deadline() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Silence);
    let client = client_with(transport, true);

    let before = Instant::now();
    let err = client.create("machinery", sample_fields()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout));

    let elapsed = before.elapsed();
    assert!(elapsed >= Duration::from_secs(8));
    assert!(elapsed < Duration::from_millis(8200));
}

#[tokio::test(start_paused = true)]
async fn configured_deadline_is_honored() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Silence);
    let client = LedgerClient::with_config(
        transport,
        Arc::new(SharedProbe::new(true)),
        RemoteConfig {
            call_timeout: Duration::from_secs(2),
        },
    );

    let before = Instant::now();
    let err = client.list("machinery").await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout));
    assert!(before.elapsed() >= Duration::from_secs(2));
    assert!(before.elapsed() < Duration::from_millis(2200));
}

// ── Registry cleanup ─────────────────────────────────────────────

#[tokio::test]
async fn registry_is_empty_after_resolution() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Respond(RemoteResponse::ok()));
    let client = client_with(transport, true);

    client.create("machinery", sample_fields()).await.unwrap();
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn registry_is_empty_after_timeout_and_late_reply_is_dropped() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Silence);
    let client = client_with(transport.clone(), true);

    let err = client.create("machinery", sample_fields()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout));
    assert_eq!(client.pending_calls(), 0);

    // The reply shows up after the deadline already resolved the call.
    assert!(!transport.resolve_parked(Ok(RemoteResponse::ok())));
}

#[tokio::test]
async fn duplicate_reply_is_dropped() {
    let transport = Arc::new(MockTransport::new());
    transport.push(MockReply::Silence);
    let client = Arc::new(client_with(transport.clone(), true));

    let call = {
        let client = client.clone();
        tokio::spawn(async move { client.create("machinery", sample_fields()).await })
    };

    let parked = loop {
        if let Some(parked) = transport.take_parked() {
            break parked;
        }
        tokio::task::yield_now().await;
    };

    let (token, sink) = parked;
    assert!(sink.resolve(token, Ok(RemoteResponse::ok())));
    assert!(!sink.resolve(token, Ok(RemoteResponse::ok())));

    let response = call.await.unwrap().unwrap();
    assert!(response.success);
    assert_eq!(client.pending_calls(), 0);
}
