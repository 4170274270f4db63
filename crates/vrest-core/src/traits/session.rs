// # Session Trait
//
// Defines the interface of the authenticated connection to the management API.
//
// ## Implementations
//
// - REST over HTTPS: `vrest-session` crate
// - Scripted doubles: `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use vrest_core::Session;
//
// async fn show(session: &dyn Session) -> vrest_core::Result<()> {
//     let url = format!("{}/api/vcenter/vm", session.base_url());
//     let response = session.get(&url).await?;
//     println!("{} {}", response.status, response.json_body()?);
//     Ok(())
// }
// ```

use crate::config::ConnectionConfig;
use crate::descriptor::HttpMethod;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Raw answer of the remote API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Raw body text
    pub text: String,
}

impl RawResponse {
    /// Create a response from its parts
    pub fn new(status: u16, content_type: Option<String>, text: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            text: text.into(),
        }
    }

    /// A JSON response
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, Some("application/json".to_string()), body.to_string())
    }

    /// A response without a body
    pub fn empty(status: u16) -> Self {
        Self::new(status, None, "")
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the response declares a JSON content type
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
    }

    /// Parsed body
    ///
    /// Non-JSON content types and empty bodies yield an empty object rather
    /// than a parse failure.
    pub fn json_body(&self) -> Result<Value> {
        if !self.is_json() || self.text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(serde_json::from_str(&self.text)?)
    }
}

/// Authenticated session with the management API
///
/// The engine never logs in, validates certificates or pools connections
/// itself; it receives an already-open session and only issues requests.
///
/// # Thread Safety
///
/// Implementations must be usable from concurrent invocations. The engine
/// holds sessions behind an `Arc` and never mutates them.
///
/// # Failures
///
/// `request` returns `Err` only for transport-level failures (connection
/// refused, TLS, unreadable body). Any HTTP status, including 4xx and 5xx,
/// is a successful [`RawResponse`]. Implementations must not retry.
#[async_trait]
pub trait Session: Send + Sync {
    /// Base URL requests are rendered against (e.g. `https://vcenter.example`)
    fn base_url(&self) -> &str;

    /// Send one request
    ///
    /// # Parameters
    ///
    /// - `method`: HTTP verb
    /// - `url`: absolute URL
    /// - `body`: optional JSON body
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse>;

    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.request(HttpMethod::Get, url, None).await
    }

    async fn put(&self, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.request(HttpMethod::Put, url, body).await
    }

    async fn post(&self, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.request(HttpMethod::Post, url, body).await
    }

    async fn delete(&self, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.request(HttpMethod::Delete, url, body).await
    }
}

/// Helper trait for opening sessions from configuration
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Log in and return a ready session
    ///
    /// Authentication failures are reported as [`crate::Error::Authentication`].
    async fn open(&self, config: &ConnectionConfig) -> Result<Arc<dyn Session>>;
}
