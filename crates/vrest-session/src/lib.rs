// # vrest-session
//
// Authenticated HTTPS session for the management REST API, implementing the
// `Session` trait of `vrest-core`.
//
// ## Behavior
//
// - One login per session: `POST /api/session` with HTTP basic auth
// - The returned token is sent as `vmware-api-session-id` on every request
// - HTTP timeout configured (60 seconds)
// - Certificate validation can be turned off per connection
// - Optional REST log file: method, URL, status and answer of every request
//   are appended as one JSON line; request bodies are never written
// - NO retry logic, NO caching, NO background tasks
//
// Any HTTP status is returned to the caller as a `RawResponse`; only
// connection-level failures become errors.
//
// ## Security Requirements
//
// - Password and session token NEVER appear in logs or Debug output
// - Empty credentials are rejected before any connection is attempted

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use vrest_core::config::ConnectionConfig;
use vrest_core::traits::{RawResponse, Session, SessionFactory};
use vrest_core::{Error, HttpMethod, Result};

/// Path of the session endpoint
const SESSION_PATH: &str = "/api/session";

/// Header carrying the session token
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// Default HTTP timeout for API requests (60 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticated REST session
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the session token.
pub struct RestSession {
    base_url: String,

    /// Session token returned by the login call
    /// ⚠️ NEVER log this value
    token: String,

    client: reqwest::Client,

    /// File receiving one JSON line per request/response pair
    rest_log_file: Option<PathBuf>,
}

// Custom Debug implementation that hides the session token
impl std::fmt::Debug for RestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSession")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .field("rest_log_file", &self.rest_log_file)
            .finish()
    }
}

impl RestSession {
    /// Log in and create a session
    ///
    /// # Parameters
    ///
    /// - `config`: Connection parameters; validated before connecting
    ///
    /// # Returns
    ///
    /// - `Ok(RestSession)`: A session holding a fresh token
    /// - `Err(Error::Config)`: Empty hostname, username or password
    /// - `Err(Error::Authentication)`: The server rejected the credentials
    /// - `Err(Error::Transport)`: Connection failure or unexpected login answer
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /api/session
    /// Authorization: Basic <credentials>
    /// ```
    pub async fn login(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let client = build_client(config.validate_certs)?;
        let base_url = config.base_url();
        let url = format!("{}{}", base_url, SESSION_PATH);

        tracing::debug!(url = %url, user = %config.username, "Opening session");

        let response = client
            .post(&url)
            .basic_auth(&config.username, Some(&config.password))
            .send()
            .await
            .map_err(|e| Error::transport(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "Invalid credentials for {}. Status: {}",
                    config.username, status
                ))),
                _ => Err(Error::transport(format!(
                    "Login failed: {} - {}",
                    status, error_text
                ))),
            };
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::transport(format!("Failed to parse login response: {}", e)))?;
        let token = session_token(&body)
            .ok_or_else(|| Error::transport("Login response carried no session token"))?;

        tracing::info!(host = %config.hostname, "Session opened");

        Ok(Self {
            base_url,
            token,
            client,
            rest_log_file: config.rest_log_file.as_ref().map(PathBuf::from),
        })
    }

    /// Append one interaction to the REST log file
    ///
    /// Request bodies may carry passwords and are left out. Failures to write
    /// are logged and otherwise ignored.
    async fn record(&self, method: HttpMethod, url: &str, response: &RawResponse) {
        let Some(path) = &self.rest_log_file else {
            return;
        };

        let entry = json!({
            "method": method.as_str(),
            "url": url,
            "status": response.status,
            "response": response.text,
        });
        let line = format!("{}\n", entry);

        let written = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write REST log file");
        }
    }
}

#[async_trait]
impl Session for RestSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        let mut request = self
            .client
            .request(reqwest_method(method), url)
            .header(SESSION_HEADER, &self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(method = %method, url = %url, status, "Request completed");

        let raw = RawResponse::new(status, content_type, text);
        self.record(method, url, &raw).await;
        Ok(raw)
    }
}

/// Factory opening [`RestSession`]s
pub struct RestSessionFactory;

#[async_trait]
impl SessionFactory for RestSessionFactory {
    async fn open(&self, config: &ConnectionConfig) -> Result<Arc<dyn Session>> {
        if !config.validate_certs {
            tracing::warn!(host = %config.hostname, "TLS certificate validation is disabled");
        }
        Ok(Arc::new(RestSession::login(config).await?))
    }
}

fn build_client(validate_certs: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .danger_accept_invalid_certs(!validate_certs)
        .build()
        .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Token from a login answer: a bare JSON string or `{"value": token}`
fn session_token(body: &Value) -> Option<String> {
    let token = match body {
        Value::String(token) => token.as_str(),
        Value::Object(map) => map.get("value")?.as_str()?,
        _ => return None,
    };
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_shapes() {
        assert_eq!(session_token(&json!("abc")), Some("abc".to_string()));
        assert_eq!(session_token(&json!({"value": "abc"})), Some("abc".to_string()));
        assert_eq!(session_token(&json!("")), None);
        assert_eq!(session_token(&json!({"token": "abc"})), None);
        assert_eq!(session_token(&json!(42)), None);
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_client_builds_without_certificate_validation() {
        assert!(build_client(false).is_ok());
        assert!(build_client(true).is_ok());
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let session = RestSession {
            base_url: "https://vcenter.test".to_string(),
            token: "secret_token_12345".to_string(),
            client: build_client(true).unwrap(),
            rest_log_file: None,
        };

        let debug_str = format!("{:?}", session);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("RestSession"));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_before_connecting() {
        let config = ConnectionConfig::new("vcenter.test", "", "pass");
        let err = RestSession::login(&config).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
