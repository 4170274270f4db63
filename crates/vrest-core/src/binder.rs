//! Parameter binding: ParameterSet + operation → concrete request
//!
//! ## Rules
//!
//! 1. **Path**: every `{placeholder}` in the URL template is replaced with
//!    the matching parameter. A placeholder without a value is a
//!    precondition error; a malformed URL is never produced.
//! 2. **Query**: declared query fields are appended in declaration order so
//!    URLs stay deterministic. Lists become repeated `key=value` pairs.
//!    Keys and values are form-encoded when the URL is rendered.
//! 3. **Body**: declared body fields that are present are copied under
//!    their wire names. Absent fields are omitted, never sent as `null`, so
//!    a partial update cannot clobber server-side values.

use crate::descriptor::{HttpMethod, OperationDescriptor};
use crate::error::{Error, Result};
use crate::params::ParameterSet;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;

/// A fully bound HTTP request, built right before it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Path with placeholders substituted; may carry a fixed `?action=...`
    pub path: String,
    /// Query pairs in declaration order
    pub query: Vec<(String, String)>,
    /// JSON body; `None` for GET requests
    pub body: Option<Value>,
}

impl RequestSpec {
    /// Render the full URL against the session base URL
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            url.push(if self.path.contains('?') { '&' } else { '?' });
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            url.push_str(&query);
        }
        url
    }

    /// The same target read back with a GET
    pub fn as_read(&self) -> Self {
        Self {
            method: HttpMethod::Get,
            path: self.path.clone(),
            query: self.query.clone(),
            body: None,
        }
    }
}

/// Bind a parameter set to an operation
pub fn bind(params: &ParameterSet, operation: &OperationDescriptor) -> Result<RequestSpec> {
    let path = substitute_path(params, operation)?;
    let query = bind_query(params, operation);
    let body = match operation.method {
        HttpMethod::Get => None,
        _ => Some(Value::Object(bind_body(params, operation))),
    };

    debug!(
        operation = operation.name,
        method = %operation.method,
        path = %path,
        query_pairs = query.len(),
        "Bound request"
    );

    Ok(RequestSpec {
        method: operation.method,
        path,
        query,
        body,
    })
}

fn substitute_path(params: &ParameterSet, operation: &OperationDescriptor) -> Result<String> {
    let template = operation.path;
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::config(format!("Unterminated placeholder in URL template: {}", template))
        })?;
        let placeholder = &after[..close];

        let logical = operation.fields.path_field_for(placeholder).ok_or_else(|| {
            Error::config(format!(
                "Operation '{}' has no path mapping for placeholder '{{{}}}'",
                operation.name, placeholder
            ))
        })?;

        let value = params.get(logical).ok_or_else(|| {
            Error::precondition(format!(
                "{} is required to build {} {}",
                logical, operation.method, template
            ))
        })?;

        let rendered = render_scalar(value).ok_or_else(|| {
            Error::precondition(format!("{} must be a scalar to be used in a URL path", logical))
        })?;
        if rendered.is_empty() {
            return Err(Error::precondition(format!(
                "{} cannot be empty when building {}",
                logical, template
            )));
        }

        out.push_str(&rendered);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

fn bind_query(params: &ParameterSet, operation: &OperationDescriptor) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (logical, wire) in operation.fields.query {
        let Some(value) = params.get(logical) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(rendered) = render_scalar(item) {
                        pairs.push((wire.to_string(), rendered));
                    }
                }
            }
            Value::Bool(false) => {}
            Value::Bool(true) => pairs.push((wire.to_string(), "true".to_string())),
            Value::String(s) if s.is_empty() => {}
            other => {
                if let Some(rendered) = render_scalar(other) {
                    pairs.push((wire.to_string(), rendered));
                }
            }
        }
    }

    pairs
}

fn bind_body(params: &ParameterSet, operation: &OperationDescriptor) -> Map<String, Value> {
    let mut body = Map::new();

    for (logical, wire) in operation.fields.body {
        if let Some(value) = params.get(logical) {
            insert_nested(&mut body, wire, value.clone());
        }
    }

    body
}

/// Insert `value` at a `/`-separated wire path, creating intermediate objects
fn insert_nested(body: &mut Map<String, Value>, wire: &str, value: Value) {
    match wire.split_once('/') {
        None => {
            body.insert(wire.to_string(), value);
        }
        Some((head, tail)) => {
            let slot = body
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                insert_nested(inner, tail, value);
            }
        }
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
