//! Contract Test: REST Session
//!
//! This test verifies the session against a mock HTTP server.
//!
//! Constraints verified:
//! - Login uses basic auth and the token travels in the session header
//! - Rejected credentials are authentication errors
//! - Every HTTP status, including 5xx, is returned as data
//! - The REST log file receives one line per interaction, without request bodies
//! - Connection failures are transport errors

use serde_json::{Value, json};
use vrest_core::config::ConnectionConfig;
use vrest_core::traits::{Session, SessionFactory};
use vrest_core::{Error, HttpMethod};
use vrest_session::{RestSession, RestSessionFactory, SESSION_HEADER};
use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_login(token: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .and(basic_auth("administrator@vsphere.local", "secret"))
        .respond_with(ResponseTemplate::new(201).set_body_json(token))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn config(server: &MockServer) -> ConnectionConfig {
    ConnectionConfig::new(server.uri(), "administrator@vsphere.local", "secret")
}

#[tokio::test]
async fn login_token_is_sent_on_every_request() {
    let server = server_with_login(json!("tok-1")).await;
    Mock::given(method("GET"))
        .and(path("/api/vcenter/vm"))
        .and(query_param("names", "web"))
        .and(header(SESSION_HEADER, "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"vm": "vm-1", "name": "web"}])))
        .expect(1)
        .mount(&server)
        .await;

    let session = RestSessionFactory.open(&config(&server)).await.expect("login succeeds");
    assert_eq!(session.base_url(), server.uri());

    let url = format!("{}/api/vcenter/vm?names=web", session.base_url());
    let response = session.get(&url).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_json());
    assert_eq!(response.json_body().unwrap(), json!([{"vm": "vm-1", "name": "web"}]));
}

#[tokio::test]
async fn enveloped_login_token_is_accepted() {
    let server = server_with_login(json!({"value": "tok-2"})).await;
    Mock::given(method("PUT"))
        .and(path("/api/appliance/networking/proxy/http"))
        .and(header(SESSION_HEADER, "tok-2"))
        .and(body_json(json!({"enabled": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = RestSession::login(&config(&server)).await.unwrap();
    let url = format!("{}/api/appliance/networking/proxy/http", server.uri());
    let response = session
        .request(HttpMethod::Put, &url, Some(&json!({"enabled": true})))
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.json_body().unwrap(), json!({}));
}

#[tokio::test]
async fn rejected_credentials_are_authentication_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error_type": "UNAUTHENTICATED"})))
        .mount(&server)
        .await;

    let err = RestSession::login(&config(&server)).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(!err.to_string().contains("secret"));
}

#[tokio::test]
async fn server_errors_are_returned_as_data() {
    let server = server_with_login(json!("tok-3")).await;
    Mock::given(method("GET"))
        .and(path("/api/vcenter/vm/vm-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let session = RestSession::login(&config(&server)).await.unwrap();
    let response = session
        .get(&format!("{}/api/vcenter/vm/vm-1", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.text, "internal error");
    assert!(!response.is_success());
}

#[tokio::test]
async fn rest_log_file_records_each_interaction() {
    let server = server_with_login(json!("tok-4")).await;
    Mock::given(method("DELETE"))
        .and(path("/api/vcenter/vm/vm-1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("rest.log");
    let config = config(&server).with_rest_log_file(log_path.to_string_lossy());

    let session = RestSession::login(&config).await.unwrap();
    let url = format!("{}/api/vcenter/vm/vm-1", server.uri());
    session.delete(&url, None).await.unwrap();
    session.delete(&url, None).await.unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["method"], "DELETE");
    assert_eq!(lines[0]["url"], url);
    assert_eq!(lines[0]["status"], 204);
    assert!(!contents.contains("tok-4"));
    assert!(!contents.contains("secret"));
}

#[tokio::test]
async fn rest_log_file_never_records_request_bodies() {
    let server = server_with_login(json!("tok-5")).await;
    Mock::given(method("PUT"))
        .and(path("/api/appliance/networking/proxy/http"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("rest.log");
    let config = config(&server).with_rest_log_file(log_path.to_string_lossy());

    let session = RestSession::login(&config).await.unwrap();
    let url = format!("{}/api/appliance/networking/proxy/http", server.uri());
    let body = json!({"enabled": true, "password": "hunter2", "username": "proxyuser"});
    session.request(HttpMethod::Put, &url, Some(&body)).await.unwrap();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let line: Value = serde_json::from_str(contents.trim()).unwrap();

    assert_eq!(line["method"], "PUT");
    assert_eq!(line["status"], 204);
    assert!(line.get("request").is_none());
    assert!(!contents.contains("hunter2"));
    assert!(!contents.contains("proxyuser"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Nothing listens on the discard port
    let config = ConnectionConfig::new("http://127.0.0.1:9", "user", "pass");

    let err = RestSession::login(&config).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
