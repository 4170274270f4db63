//! Desired state and the validated parameter set of one invocation

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Desired state requested by the caller
///
/// Exactly one state drives an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    /// Create the resource, or update it if it already exists
    Present,
    /// Delete the resource if it exists
    Absent,
    /// Apply configuration to a singleton resource
    Set,
    /// Validate the configuration against the remote endpoint
    Test,
    Clone,
    InstantClone,
    Register,
    Relocate,
    Unregister,
}

impl DesiredState {
    /// Every state, in declaration order
    pub const ALL: &'static [DesiredState] = &[
        DesiredState::Present,
        DesiredState::Absent,
        DesiredState::Set,
        DesiredState::Test,
        DesiredState::Clone,
        DesiredState::InstantClone,
        DesiredState::Register,
        DesiredState::Relocate,
        DesiredState::Unregister,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
            DesiredState::Set => "set",
            DesiredState::Test => "test",
            DesiredState::Clone => "clone",
            DesiredState::InstantClone => "instant_clone",
            DesiredState::Register => "register",
            DesiredState::Relocate => "relocate",
            DesiredState::Unregister => "unregister",
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesiredState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DesiredState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::precondition(format!("Unknown state: {}", s)))
    }
}

/// Validated input of one invocation
///
/// A JSON `null` is treated exactly like an absent key. The set is
/// read-only; [`ParameterSet::with_value`] derives a new set, which is how a
/// resolved identifier is threaded into later requests.
#[derive(Clone, PartialEq)]
pub struct ParameterSet {
    state: DesiredState,
    values: Map<String, Value>,
}

impl ParameterSet {
    /// Create a parameter set from already-validated values
    pub fn new(state: DesiredState, values: Map<String, Value>) -> Self {
        Self { state, values }
    }

    /// Create a parameter set from a JSON object
    pub fn from_value(state: DesiredState, value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self::new(state, values)),
            Value::Null => Ok(Self::new(state, Map::new())),
            other => Err(Error::precondition(format!(
                "Parameters must be a JSON object, got: {}",
                other
            ))),
        }
    }

    /// The desired state of this invocation
    pub fn state(&self) -> DesiredState {
        self.state
    }

    /// Get a present, non-null value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// Get a present string value
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Whether a non-null value is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Derive a new parameter set with one value replaced
    pub fn with_value(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value.into());
        Self {
            state: self.state,
            values,
        }
    }

    /// All values, including explicit nulls
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Copy of the values with the listed fields masked, for logging
    pub fn redacted(&self, secret_fields: &[&str]) -> Value {
        let masked = self
            .values
            .iter()
            .map(|(k, v)| {
                if secret_fields.contains(&k.as_str()) && !v.is_null() {
                    (k.clone(), Value::String("********".to_string()))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect();
        Value::Object(masked)
    }
}

// Values may hold passwords; Debug shows parameter names only
impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSet")
            .field("state", &self.state)
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
