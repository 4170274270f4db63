//! Contract Test: Response Envelope
//!
//! Servers answer either with a bare payload or with `{"value": payload}`.
//! This test verifies that both shapes produce identical outcomes.
//!
//! Constraints verified:
//! - Bare and enveloped action answers normalize to the same value
//! - Non-JSON answers become an empty object, not a parse failure
//! - Probe actions report data without claiming a change
//!
//! If this test fails, results depend on the server version.

mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use vrest_core::{DesiredState, OutcomeRecord, RawResponse, Reconciler};

async fn clone_with_answer(answer: RawResponse) -> OutcomeRecord {
    let session = Arc::new(ScriptedSession::new(vec![answer]));
    let reconciler = Reconciler::new(session.clone(), &VM);

    let outcome = reconciler
        .reconcile(&params(
            DesiredState::Clone,
            json!({"name": "web-2", "source": "vm-1"}),
        ))
        .await
        .expect("clone succeeds");

    assert_eq!(session.calls().len(), 1);
    assert_eq!(session.calls()[0].url, format!("{}/api/vcenter/vm?action=clone", BASE_URL));
    outcome
}

#[tokio::test]
async fn bare_and_enveloped_identifiers_are_equivalent() {
    let bare = clone_with_answer(RawResponse::json(200, &json!("abc123"))).await;
    let wrapped = clone_with_answer(RawResponse::json(200, &json!({"value": "abc123"}))).await;

    assert_eq!(bare.value, json!("abc123"));
    assert_eq!(bare, wrapped);
    assert!(bare.changed);
    assert_eq!(bare.diagnostic.operation, "clone");
}

#[tokio::test]
async fn non_json_answer_becomes_empty_value() {
    let outcome = clone_with_answer(RawResponse::new(
        200,
        Some("text/plain".to_string()),
        "cloned",
    ))
    .await;

    assert_eq!(outcome.value, empty());
    assert!(outcome.changed);
}

#[tokio::test]
async fn client_errors_are_reported_as_data() {
    let outcome = clone_with_answer(RawResponse::json(
        400,
        &json!({"error_type": "INVALID_ARGUMENT", "messages": []}),
    ))
    .await;

    assert!(outcome.failed);
    assert!(!outcome.changed);
    assert_eq!(outcome.value["error_type"], "INVALID_ARGUMENT");
    assert_eq!(outcome.diagnostic.http_status, Some(400));
}

#[tokio::test]
async fn probe_action_reports_without_change() {
    let server = Arc::new(FakeProxyServer::new());
    let reconciler = Reconciler::new(server.clone(), &PROXY);

    let outcome = reconciler
        .reconcile(&params(
            DesiredState::Test,
            json!({"protocol": "http", "host": "www.example.com", "config": {"server": "proxy"}}),
        ))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert!(!outcome.failed);
    assert_eq!(outcome.value, json!({"status": "OK", "message": []}));
    assert_eq!(outcome.diagnostic.operation, "test");

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        Some(json!({"config": {"server": "proxy"}, "host": "www.example.com"}))
    );
}
