//! Static resource descriptors
//!
//! A [`ResourceDescriptor`] is the build-time table that describes one
//! manageable resource kind: which operations it supports, the HTTP verb and
//! URL template of each, and where every logical parameter lands on the wire
//! (path placeholder, query string or JSON body).
//!
//! Descriptors are plain `static` values. Nothing in the engine mutates them,
//! so a single descriptor is shared by every invocation of its resource kind.
//!
//! ```rust,ignore
//! static PROXY_GET: OperationDescriptor = OperationDescriptor {
//!     name: "get",
//!     method: HttpMethod::Get,
//!     path: "/api/appliance/networking/proxy/{protocol}",
//!     kind: OperationKind::Read,
//!     fields: Fields::path(&[("protocol", "protocol")]),
//! };
//! ```

use crate::arguments::{ArgumentSpec, RequiredIf};
use crate::error::{Error, Result};
use crate::params::DesiredState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verbs used by the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the outcome classifier interprets the status of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `get` / `list`: never changes anything, 404 is a failure
    Read,
    /// Creation of a new server object
    Create,
    /// In-place mutation (`set`, `update`)
    Mutate,
    /// Removal; 404 means "already gone"
    Delete,
    /// Action endpoint with a server-side effect (`clone`, `relocate`, ...)
    Action,
    /// Action endpoint that only validates (`test`)
    Probe,
}

/// Logical parameter name → wire field name
pub type FieldMap = &'static [(&'static str, &'static str)];

/// Path, query and body field mappings of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub path: FieldMap,
    pub query: FieldMap,
    pub body: FieldMap,
}

impl Fields {
    /// No parameters at all
    pub const NONE: Fields = Fields {
        path: &[],
        query: &[],
        body: &[],
    };

    /// Only path parameters
    pub const fn path(path: FieldMap) -> Self {
        Fields {
            path,
            query: &[],
            body: &[],
        }
    }

    /// Only query parameters
    pub const fn query(query: FieldMap) -> Self {
        Fields {
            path: &[],
            query,
            body: &[],
        }
    }

    /// Only body parameters
    pub const fn body(body: FieldMap) -> Self {
        Fields {
            path: &[],
            query: &[],
            body,
        }
    }

    /// Path and body parameters
    pub const fn path_and_body(path: FieldMap, body: FieldMap) -> Self {
        Fields {
            path,
            query: &[],
            body,
        }
    }

    /// Logical name bound to a wire path placeholder
    pub fn path_field_for(&self, placeholder: &str) -> Option<&'static str> {
        self.path
            .iter()
            .find(|(_, wire)| *wire == placeholder)
            .map(|(logical, _)| *logical)
    }

    /// Whether the logical field is used in the path
    pub fn uses_path_field(&self, logical: &str) -> bool {
        self.path.iter().any(|(name, _)| *name == logical)
    }
}

/// One operation of a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Operation name (`get`, `list`, `create`, `set`, `delete`, `clone`, ...)
    pub name: &'static str,
    pub method: HttpMethod,
    /// URL template relative to the API host, `{placeholders}` and a fixed
    /// `?action=...` suffix allowed
    pub path: &'static str,
    pub kind: OperationKind,
    pub fields: Fields,
}

/// How a human-chosen key is translated into a server identifier
///
/// The `list` operation is queried with `filter = [value]`, and the first
/// item whose `field` equals the requested value yields its `id_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturalKey {
    /// Logical field holding the natural key (e.g. `name`)
    pub field: &'static str,
    /// Logical query field of the `list` operation used to filter (e.g. `names`)
    pub filter: &'static str,
    /// Key of the identifier inside a list item (e.g. `vm`)
    pub id_key: &'static str,
}

/// Build-time description of one resource kind
#[derive(Debug)]
pub struct ResourceDescriptor {
    /// Resource kind name (e.g. `vcenter_vm`)
    pub kind: &'static str,
    pub operations: &'static [OperationDescriptor],
    /// Recognized user-settable parameters
    pub arguments: &'static [ArgumentSpec],
    /// Fields required for specific states
    pub required_if: &'static [RequiredIf],
    /// States accepted by this resource kind
    pub states: &'static [DesiredState],
    pub default_state: DesiredState,
    /// Secondary identifier field resolved before path substitution
    pub identifier: Option<&'static str>,
    pub natural_key: Option<NaturalKey>,
    /// Object parameter whose entries back-fill absent top-level fields
    pub nested_config: Option<&'static str>,
}

impl ResourceDescriptor {
    /// Look up an operation by name
    ///
    /// An unknown name is a configuration error of the descriptor or of the
    /// caller, never something to recover from at runtime.
    pub fn operation(&self, name: &str) -> Result<&'static OperationDescriptor> {
        self.operations
            .iter()
            .find(|op| op.name == name)
            .ok_or_else(|| {
                Error::config(format!(
                    "Resource '{}' does not support operation '{}'",
                    self.kind, name
                ))
            })
    }

    /// Check whether an operation is supported
    pub fn supports(&self, name: &str) -> bool {
        self.operations.iter().any(|op| op.name == name)
    }

    /// Secondary identifier field used for existence checks, if any
    pub fn identifier(&self) -> Option<&'static str> {
        self.identifier
    }

    /// Check whether a state is accepted by this resource kind
    pub fn accepts_state(&self, state: DesiredState) -> bool {
        self.states.contains(&state)
    }

    /// Look up the argument specification of a parameter
    pub fn argument(&self, name: &str) -> Option<&'static ArgumentSpec> {
        self.arguments.iter().find(|arg| arg.name == name)
    }
}
