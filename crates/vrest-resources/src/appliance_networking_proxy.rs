//! Appliance proxy configuration (`appliance_networking_proxy`)
//!
//! One configuration per protocol (`http`, `https`, `ftp`). The resource
//! always exists server-side, so `set` is a before/after-compared PUT and
//! `absent` resets the configuration.
//!
//! ```http
//! GET    /api/appliance/networking/proxy
//! GET    /api/appliance/networking/proxy/{protocol}
//! PUT    /api/appliance/networking/proxy/{protocol}
//! DELETE /api/appliance/networking/proxy/{protocol}
//! POST   /api/appliance/networking/proxy/{protocol}?action=test
//! ```

use vrest_core::arguments::{ArgumentSpec, ArgumentType, RequiredIf};
use vrest_core::descriptor::{Fields, HttpMethod, OperationDescriptor, OperationKind, ResourceDescriptor};
use vrest_core::params::DesiredState;

const PROTOCOL: &[(&str, &str)] = &[("protocol", "protocol")];

static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "list",
        method: HttpMethod::Get,
        path: "/api/appliance/networking/proxy",
        kind: OperationKind::Read,
        fields: Fields::NONE,
    },
    OperationDescriptor {
        name: "get",
        method: HttpMethod::Get,
        path: "/api/appliance/networking/proxy/{protocol}",
        kind: OperationKind::Read,
        fields: Fields::path(PROTOCOL),
    },
    OperationDescriptor {
        name: "set",
        method: HttpMethod::Put,
        path: "/api/appliance/networking/proxy/{protocol}",
        kind: OperationKind::Mutate,
        fields: Fields::path_and_body(
            PROTOCOL,
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
        fields: Fields::path(PROTOCOL),
    },
    OperationDescriptor {
        name: "test",
        method: HttpMethod::Post,
        path: "/api/appliance/networking/proxy/{protocol}?action=test",
        kind: OperationKind::Probe,
        fields: Fields::path_and_body(PROTOCOL, &[("config", "config"), ("host", "host")]),
    },
];

static ARGUMENTS: &[ArgumentSpec] = &[
    ArgumentSpec::new("config", ArgumentType::Dict),
    ArgumentSpec::new("enabled", ArgumentType::Bool),
    ArgumentSpec::new("host", ArgumentType::Str),
    ArgumentSpec::new("password", ArgumentType::Str).no_log(),
    ArgumentSpec::new("port", ArgumentType::Int),
    ArgumentSpec::new("protocol", ArgumentType::Str).required(),
    ArgumentSpec::new("server", ArgumentType::Str),
    ArgumentSpec::new("username", ArgumentType::Str).no_log(),
];

static REQUIRED_IF: &[RequiredIf] = &[
    RequiredIf {
        state: DesiredState::Set,
        fields: &["enabled", "port", "server"],
    },
    RequiredIf {
        state: DesiredState::Test,
        fields: &["config", "host"],
    },
];

/// Descriptor of the `appliance_networking_proxy` resource kind
pub static APPLIANCE_NETWORKING_PROXY: ResourceDescriptor = ResourceDescriptor {
    kind: "appliance_networking_proxy",
    operations: OPERATIONS,
    arguments: ARGUMENTS,
    required_if: REQUIRED_IF,
    states: &[DesiredState::Absent, DesiredState::Set, DesiredState::Test],
    default_state: DesiredState::Set,
    identifier: None,
    natural_key: None,
    nested_config: Some("config"),
};
