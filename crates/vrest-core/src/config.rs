//! Configuration types for the reconciliation engine
//!
//! This module defines the connection configuration and the per-invocation
//! configuration assembled from a module argument document.

use crate::arguments::validate_arguments;
use crate::descriptor::ResourceDescriptor;
use crate::error::{Error, Result};
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Environment variable used when `vcenter_hostname` is not given
pub const ENV_HOST: &str = "VMWARE_HOST";
/// Environment variable used when `vcenter_username` is not given
pub const ENV_USER: &str = "VMWARE_USER";
/// Environment variable used when `vcenter_password` is not given
pub const ENV_PASSWORD: &str = "VMWARE_PASSWORD";
/// Environment variable used when `vcenter_validate_certs` is not given
pub const ENV_VALIDATE_CERTS: &str = "VMWARE_VALIDATE_CERTS";
/// Environment variable used when `vcenter_rest_log_file` is not given
pub const ENV_REST_LOG_FILE: &str = "VMWARE_REST_LOG_FILE";

/// Key wrapping the arguments in module argument files
const MODULE_ARGS_KEY: &str = "ANSIBLE_MODULE_ARGS";

/// Connection parameters of the management API
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Hostname or IP address of the management server
    pub hostname: String,

    pub username: String,

    /// ⚠️ NEVER log this value
    pub password: String,

    /// Reject invalid TLS certificates
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,

    /// File recording every REST interaction
    #[serde(default)]
    pub rest_log_file: Option<String>,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("validate_certs", &self.validate_certs)
            .field("rest_log_file", &self.rest_log_file)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create a connection configuration with certificate validation on
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
            validate_certs: default_validate_certs(),
            rest_log_file: None,
        }
    }

    /// Enable or disable certificate validation
    pub fn with_validate_certs(mut self, validate_certs: bool) -> Self {
        self.validate_certs = validate_certs;
        self
    }

    /// Record REST interactions in a file
    pub fn with_rest_log_file(mut self, path: impl Into<String>) -> Self {
        self.rest_log_file = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            return Err(Error::config("vcenter_hostname cannot be empty"));
        }
        if self.username.is_empty() {
            return Err(Error::config("vcenter_username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::config("vcenter_password cannot be empty"));
        }
        Ok(())
    }

    /// Base URL of the API (`https://{hostname}`)
    pub fn base_url(&self) -> String {
        if self.hostname.starts_with("https://") || self.hostname.starts_with("http://") {
            self.hostname.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.hostname)
        }
    }

    /// Extract the `vcenter_*` arguments, falling back to the process environment
    ///
    /// The connection keys are removed from `args` so that only resource
    /// parameters remain.
    pub fn from_arguments(args: &mut Map<String, Value>) -> Result<Self> {
        Self::from_arguments_with(args, |name| std::env::var(name).ok())
    }

    /// Same as [`ConnectionConfig::from_arguments`] with an explicit environment lookup
    pub fn from_arguments_with<F>(args: &mut Map<String, Value>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut take = |key: &str, var: &str| -> Option<Value> {
            match args.remove(key) {
                Some(Value::Null) | None => env(var).map(Value::String),
                Some(value) => Some(value),
            }
        };

        let hostname = take("vcenter_hostname", ENV_HOST);
        let username = take("vcenter_username", ENV_USER);
        let password = take("vcenter_password", ENV_PASSWORD);
        let validate_certs = take("vcenter_validate_certs", ENV_VALIDATE_CERTS);
        let rest_log_file = take("vcenter_rest_log_file", ENV_REST_LOG_FILE);

        let validate_certs = match validate_certs {
            None => default_validate_certs(),
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => parse_bool(&s).ok_or_else(|| {
                Error::config(format!("vcenter_validate_certs is not a boolean: {}", s))
            })?,
            Some(other) => {
                return Err(Error::config(format!(
                    "vcenter_validate_certs is not a boolean: {}",
                    other
                )));
            }
        };

        let config = Self {
            hostname: string_or_empty(hostname, "vcenter_hostname")?,
            username: string_or_empty(username, "vcenter_username")?,
            password: string_or_empty(password, "vcenter_password")?,
            validate_certs,
            rest_log_file: match rest_log_file {
                Some(Value::String(path)) if !path.is_empty() => Some(path),
                _ => None,
            },
        };
        config.validate()?;

        Ok(config)
    }
}

/// Everything one invocation needs: where to connect and what to reconcile
#[derive(Debug, Clone)]
pub struct InvocationConfig {
    pub connection: ConnectionConfig,
    pub params: ParameterSet,
}

impl InvocationConfig {
    /// Build from a module argument document
    ///
    /// The document is either the argument object itself or an object with
    /// the arguments under `ANSIBLE_MODULE_ARGS`.
    pub fn from_json(document: Value, descriptor: &ResourceDescriptor) -> Result<Self> {
        Self::from_json_with(document, descriptor, |name| std::env::var(name).ok())
    }

    /// Same as [`InvocationConfig::from_json`] with an explicit environment lookup
    pub fn from_json_with<F>(document: Value, descriptor: &ResourceDescriptor, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut args = match document {
            Value::Object(mut map) => match map.remove(MODULE_ARGS_KEY) {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(Error::config(format!("{} must be an object", MODULE_ARGS_KEY)));
                }
                None => map,
            },
            other => {
                return Err(Error::config(format!(
                    "Module arguments must be a JSON object, got: {}",
                    other
                )));
            }
        };

        // Internal keys injected by some callers (`_ansible_check_mode`, ...)
        args.retain(|key, _| !key.starts_with('_'));

        let connection = ConnectionConfig::from_arguments_with(&mut args, env)?;
        let params = validate_arguments(descriptor, args)?;

        Ok(Self { connection, params })
    }

    /// Read a module argument file
    pub fn from_file(path: impl AsRef<Path>, descriptor: &ResourceDescriptor) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&text)?;
        Self::from_json(document, descriptor)
    }
}

fn string_or_empty(value: Option<Value>, key: &str) -> Result<String> {
    match value {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::config(format!("{} must be a string, got: {}", key, other))),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn default_validate_certs() -> bool {
    true
}
