//! Test doubles and fixture descriptors for reconciliation contract tests
//!
//! This module provides minimal sessions that record every request, plus two
//! descriptors shaped like the proxy configuration and virtual machine
//! resource kinds.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use vrest_core::arguments::{ArgumentSpec, ArgumentType, RequiredIf};
use vrest_core::descriptor::{
    Fields, HttpMethod, NaturalKey, OperationDescriptor, OperationKind, ResourceDescriptor,
};
use vrest_core::{DesiredState, Error, ParameterSet, RawResponse, Result, Session};

pub const BASE_URL: &str = "https://vcenter.test";

/// One request seen by a test session
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

/// A session answering from a fixed queue of responses
pub struct ScriptedSession {
    responses: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedSession {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Methods of the requests received so far
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    /// Number of scripted responses not consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn request(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::transport(format!("no scripted response for {} {}", method, url)))
    }
}

/// A session that always fails at the transport level
pub struct UnreachableSession;

#[async_trait]
impl Session for UnreachableSession {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn request(&self, _method: HttpMethod, url: &str, _body: Option<&Value>) -> Result<RawResponse> {
        Err(Error::transport(format!("connection refused: {}", url)))
    }
}

/// A stateful fake of the per-protocol proxy configuration endpoint
pub struct FakeProxyServer {
    state: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeProxyServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn default_config() -> Value {
        json!({"enabled": false, "port": -1, "server": ""})
    }

    /// Current server-side configuration of a protocol
    pub fn config(&self, protocol: &str) -> Value {
        self.state
            .lock()
            .unwrap()
            .get(protocol)
            .cloned()
            .unwrap_or_else(Self::default_config)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl Session for FakeProxyServer {
    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn request(&self, method: HttpMethod, url: &str, body: Option<&Value>) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });

        let path = url
            .strip_prefix(BASE_URL)
            .and_then(|p| p.strip_prefix("/api/appliance/networking/proxy/"))
            .ok_or_else(|| Error::transport(format!("unexpected url {}", url)))?;
        let (protocol, action) = match path.split_once('?') {
            Some((protocol, query)) => (protocol.to_string(), Some(query.to_string())),
            None => (path.to_string(), None),
        };

        match (method, action.as_deref()) {
            (HttpMethod::Get, None) => Ok(RawResponse::json(200, &self.config(&protocol))),
            (HttpMethod::Put, None) => {
                let mut current = self.config(&protocol);
                if let (Some(Value::Object(update)), Value::Object(target)) = (body, &mut current) {
                    for (k, v) in update {
                        target.insert(k.clone(), v.clone());
                    }
                }
                self.state.lock().unwrap().insert(protocol, current);
                Ok(RawResponse::empty(204))
            }
            (HttpMethod::Delete, None) => {
                self.state.lock().unwrap().remove(&protocol);
                Ok(RawResponse::empty(204))
            }
            (HttpMethod::Post, Some("action=test")) => {
                Ok(RawResponse::json(200, &json!({"status": "OK", "message": []})))
            }
            _ => Ok(RawResponse::empty(400)),
        }
    }
}

static PROXY_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "get",
        method: HttpMethod::Get,
        path: "/api/appliance/networking/proxy/{protocol}",
        kind: OperationKind::Read,
        fields: Fields::path(&[("protocol", "protocol")]),
    },
    OperationDescriptor {
        name: "set",
        method: HttpMethod::Put,
        path: "/api/appliance/networking/proxy/{protocol}",
        kind: OperationKind::Mutate,
        fields: Fields::path_and_body(
            &[("protocol", "protocol")],
            &[
                ("enabled", "enabled"),
                ("password", "password"),
                ("port", "port"),
                ("server", "server"),
                ("username", "username"),
            ],
        ),
    },
    OperationDescriptor {
        name: "delete",
        method: HttpMethod::Delete,
        path: "/api/appliance/networking/proxy/{protocol}",
        kind: OperationKind::Delete,
        fields: Fields::path(&[("protocol", "protocol")]),
    },
    OperationDescriptor {
        name: "test",
        method: HttpMethod::Post,
        path: "/api/appliance/networking/proxy/{protocol}?action=test",
        kind: OperationKind::Probe,
        fields: Fields::path_and_body(&[("protocol", "protocol")], &[("config", "config"), ("host", "host")]),
    },
];

/// Proxy-shaped singleton resource
pub static PROXY: ResourceDescriptor = ResourceDescriptor {
    kind: "proxy",
    operations: PROXY_OPERATIONS,
    arguments: &[
        ArgumentSpec::new("config", ArgumentType::Dict),
        ArgumentSpec::new("enabled", ArgumentType::Bool),
        ArgumentSpec::new("host", ArgumentType::Str),
        ArgumentSpec::new("password", ArgumentType::Str).no_log(),
        ArgumentSpec::new("port", ArgumentType::Int),
        ArgumentSpec::new("protocol", ArgumentType::Str).required(),
        ArgumentSpec::new("server", ArgumentType::Str),
        ArgumentSpec::new("username", ArgumentType::Str).no_log(),
    ],
    required_if: &[RequiredIf {
        state: DesiredState::Set,
        fields: &["enabled", "port", "server"],
    }],
    states: &[DesiredState::Absent, DesiredState::Set, DesiredState::Test],
    default_state: DesiredState::Set,
    identifier: None,
    natural_key: None,
    nested_config: Some("config"),
};

static VM_OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "list",
        method: HttpMethod::Get,
        path: "/api/vcenter/vm",
        kind: OperationKind::Read,
        fields: Fields::query(&[("names", "names"), ("power_states", "power_states")]),
    },
    OperationDescriptor {
        name: "get",
        method: HttpMethod::Get,
        path: "/api/vcenter/vm/{vm}",
        kind: OperationKind::Read,
        fields: Fields::path(&[("vm", "vm")]),
    },
    OperationDescriptor {
        name: "create",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm",
        kind: OperationKind::Create,
        fields: Fields::body(&[
            ("guest_OS", "guest_OS"),
            ("memory", "memory"),
            ("name", "name"),
            ("placement", "placement"),
        ]),
    },
    OperationDescriptor {
        name: "delete",
        method: HttpMethod::Delete,
        path: "/api/vcenter/vm/{vm}",
        kind: OperationKind::Delete,
        fields: Fields::path(&[("vm", "vm")]),
    },
    OperationDescriptor {
        name: "clone",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm?action=clone",
        kind: OperationKind::Action,
        fields: Fields::body(&[("name", "name"), ("placement", "placement"), ("source", "source")]),
    },
    OperationDescriptor {
        name: "relocate",
        method: HttpMethod::Post,
        path: "/api/vcenter/vm/{vm}?action=relocate",
        kind: OperationKind::Action,
        fields: Fields::path_and_body(&[("vm", "vm")], &[("placement", "placement")]),
    },
];

/// VM-shaped resource with a server-assigned identifier
pub static VM: ResourceDescriptor = ResourceDescriptor {
    kind: "vm",
    operations: VM_OPERATIONS,
    arguments: &[
        ArgumentSpec::new("guest_OS", ArgumentType::Str),
        ArgumentSpec::new("memory", ArgumentType::Dict),
        ArgumentSpec::new("name", ArgumentType::Str),
        ArgumentSpec::new("placement", ArgumentType::Dict),
        ArgumentSpec::new("source", ArgumentType::Str),
        ArgumentSpec::new("vm", ArgumentType::Str),
    ],
    required_if: &[],
    states: &[
        DesiredState::Present,
        DesiredState::Absent,
        DesiredState::Clone,
        DesiredState::Relocate,
    ],
    default_state: DesiredState::Present,
    identifier: Some("vm"),
    natural_key: Some(NaturalKey {
        field: "name",
        filter: "names",
        id_key: "vm",
    }),
    nested_config: None,
};

/// Build a parameter set from a JSON object literal
pub fn params(state: DesiredState, value: Value) -> ParameterSet {
    ParameterSet::from_value(state, value).expect("parameters are an object")
}

/// Empty JSON object
pub fn empty() -> Value {
    Value::Object(Map::new())
}
