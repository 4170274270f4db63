//! Outcome classification
//!
//! Every reconciliation branch ends here: a status, an optional body and the
//! operation that was attempted become one [`OutcomeRecord`].

use crate::descriptor::OperationKind;
use serde::Serialize;
use serde_json::{Map, Value};

/// Diagnostic metadata attached to every outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Operation the outcome is classified as
    pub operation: String,
    /// HTTP status of the classified call; `None` when no call was needed
    #[serde(rename = "status")]
    pub http_status: Option<u16>,
}

/// Uniform result of one invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    pub changed: bool,
    /// The server reported an error the caller should look at
    pub failed: bool,
    /// Substantive payload, always unwrapped from the `{"value": ...}` envelope
    pub value: Value,
    /// Identifier of the object, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_debug_info")]
    pub diagnostic: Diagnostic,
}

impl OutcomeRecord {
    /// Outcome of a branch that decided no request was needed
    pub fn unchanged(operation: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: false,
            value: Value::Object(Map::new()),
            id: None,
            diagnostic: Diagnostic {
                operation: operation.into(),
                http_status: None,
            },
        }
    }
}

/// Wrap a body in the `{"value": ...}` envelope unless it already has one
///
/// Older servers answer with an envelope, newer ones with the bare payload;
/// both normalize to the same shape.
pub fn envelope(body: Value) -> Map<String, Value> {
    match body {
        Value::Null => {
            let mut map = Map::new();
            map.insert("value".to_string(), Value::Object(Map::new()));
            map
        }
        Value::Object(map) if map.contains_key("value") => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// Classify a response into an outcome
///
/// # Rules
///
/// - 500: failed, unchanged
/// - delete 2xx: changed; delete 404 or a `NOT_FOUND` error body: unchanged, not failed
/// - create / mutate / action 2xx: changed
/// - read / probe 2xx: unchanged
/// - any other status >= 400: failed, unchanged
pub fn classify(body: Option<Value>, status: u16, operation: &str, kind: OperationKind) -> OutcomeRecord {
    let mut data = envelope(body.unwrap_or(Value::Null));
    let value = data.remove("value").unwrap_or(Value::Null);
    let id = data.get("id").and_then(id_string);

    let success = (200..300).contains(&status);
    let not_found = status == 404 || is_not_found_error(&value);

    let (changed, failed) = match kind {
        _ if status == 500 => (false, true),
        OperationKind::Delete if success && !not_found => (true, false),
        OperationKind::Delete if not_found => (false, false),
        OperationKind::Create | OperationKind::Mutate | OperationKind::Action if success => {
            (true, false)
        }
        OperationKind::Read | OperationKind::Probe if success => (false, false),
        _ if status >= 400 => (false, true),
        _ => (false, false),
    };

    OutcomeRecord {
        changed,
        failed,
        value,
        id,
        diagnostic: Diagnostic {
            operation: operation.to_string(),
            http_status: Some(status),
        },
    }
}

fn is_not_found_error(value: &Value) -> bool {
    value.get("error_type").and_then(Value::as_str) == Some("NOT_FOUND")
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
