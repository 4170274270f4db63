//! Argument specifications and parameter validation
//!
//! Every resource descriptor declares the parameters it recognizes. Raw
//! user input is checked against that table before the engine sends a single
//! request: unknown keys, wrong types, values outside `choices` and fields
//! missing for the requested state all fail here as precondition errors.

use crate::descriptor::ResourceDescriptor;
use crate::error::{Error, Result};
use crate::params::{DesiredState, ParameterSet};
use serde_json::{Map, Value};
use tracing::debug;

/// Expected JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Str,
    Bool,
    Int,
    Dict,
    /// List of objects
    List,
    /// List of strings
    StrList,
}

impl ArgumentType {
    fn name(&self) -> &'static str {
        match self {
            ArgumentType::Str => "str",
            ArgumentType::Bool => "bool",
            ArgumentType::Int => "int",
            ArgumentType::Dict => "dict",
            ArgumentType::List => "list of dict",
            ArgumentType::StrList => "list of str",
        }
    }
}

/// Declaration of one recognized parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub kind: ArgumentType,
    pub required: bool,
    /// Allowed values; empty means unrestricted
    pub choices: &'static [&'static str],
    /// Never show the value in logs
    pub no_log: bool,
}

impl ArgumentSpec {
    pub const fn new(name: &'static str, kind: ArgumentType) -> Self {
        Self {
            name,
            kind,
            required: false,
            choices: &[],
            no_log: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn choices(self, choices: &'static [&'static str]) -> Self {
        Self { choices, ..self }
    }

    pub const fn no_log(self) -> Self {
        Self {
            no_log: true,
            ..self
        }
    }
}

/// Fields that must be present when a given state is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredIf {
    pub state: DesiredState,
    pub fields: &'static [&'static str],
}

/// Validate raw module arguments against a descriptor
///
/// `raw` must no longer contain connection parameters; see
/// [`crate::config::ConnectionConfig::from_arguments`].
pub fn validate_arguments(
    descriptor: &ResourceDescriptor,
    mut raw: Map<String, Value>,
) -> Result<ParameterSet> {
    let state = take_state(descriptor, &mut raw)?;

    if let Some(nested) = descriptor.nested_config {
        backfill_from_nested(descriptor, nested, &mut raw);
    }

    let mut unknown: Vec<&str> = raw
        .keys()
        .map(String::as_str)
        .filter(|key| descriptor.argument(key).is_none())
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(Error::precondition(format!(
            "Unsupported parameters for ({}) module: {}",
            descriptor.kind,
            unknown.join(", ")
        )));
    }

    let mut values = Map::new();
    for spec in descriptor.arguments {
        match raw.remove(spec.name) {
            Some(value) if !value.is_null() => {
                let value = coerce(spec, value)?;
                check_choices(spec, &value)?;
                values.insert(spec.name.to_string(), value);
            }
            _ if spec.required => {
                return Err(Error::precondition(format!(
                    "missing required arguments: {}",
                    spec.name
                )));
            }
            _ => {}
        }
    }

    let params = ParameterSet::new(state, values);
    check_required_if(descriptor, &params)?;

    debug!(
        resource = descriptor.kind,
        state = %state,
        "Validated {} parameter(s)",
        params.values().len()
    );

    Ok(params)
}

/// Names of the parameters that must never be logged
pub fn secret_fields(descriptor: &ResourceDescriptor) -> Vec<&'static str> {
    descriptor
        .arguments
        .iter()
        .filter(|spec| spec.no_log)
        .map(|spec| spec.name)
        .collect()
}

fn take_state(descriptor: &ResourceDescriptor, raw: &mut Map<String, Value>) -> Result<DesiredState> {
    let state = match raw.remove("state") {
        None | Some(Value::Null) => descriptor.default_state,
        Some(Value::String(s)) => s.parse::<DesiredState>()?,
        Some(other) => {
            return Err(Error::precondition(format!(
                "state must be a string, got: {}",
                other
            )));
        }
    };

    if !descriptor.accepts_state(state) {
        let choices: Vec<&str> = descriptor.states.iter().map(|s| s.as_str()).collect();
        return Err(Error::precondition(format!(
            "value of state must be one of: {}, got: {}",
            choices.join(", "),
            state
        )));
    }

    Ok(state)
}

fn backfill_from_nested(descriptor: &ResourceDescriptor, nested: &str, raw: &mut Map<String, Value>) {
    let Some(Value::Object(entries)) = raw.get(nested).cloned() else {
        return;
    };

    for (key, value) in entries {
        if key == nested || descriptor.argument(&key).is_none() {
            continue;
        }
        let absent = raw.get(&key).is_none_or(Value::is_null);
        if absent {
            raw.insert(key, value);
        }
    }
}

fn coerce(spec: &ArgumentSpec, value: Value) -> Result<Value> {
    let coerced = match (spec.kind, value) {
        (ArgumentType::Str, Value::String(s)) => Some(Value::String(s)),
        (ArgumentType::Str, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ArgumentType::Bool, Value::Bool(b)) => Some(Value::Bool(b)),
        (ArgumentType::Bool, Value::String(s)) => parse_bool(&s).map(Value::Bool),
        (ArgumentType::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(Value::Number(n)),
        (ArgumentType::Int, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ArgumentType::Dict, Value::Object(o)) => Some(Value::Object(o)),
        (ArgumentType::List, Value::Array(items)) => {
            if items.iter().all(Value::is_object) {
                Some(Value::Array(items))
            } else {
                None
            }
        }
        (ArgumentType::StrList, Value::Array(items)) => {
            if items.iter().all(Value::is_string) {
                Some(Value::Array(items))
            } else {
                None
            }
        }
        (ArgumentType::StrList, Value::String(s)) => Some(Value::Array(vec![Value::String(s)])),
        _ => None,
    };

    coerced.ok_or_else(|| {
        Error::precondition(format!(
            "argument '{}' is not of type {}",
            spec.name,
            spec.kind.name()
        ))
    })
}

fn check_choices(spec: &ArgumentSpec, value: &Value) -> Result<()> {
    if spec.choices.is_empty() {
        return Ok(());
    }

    match value.as_str() {
        Some(s) if spec.choices.contains(&s) => Ok(()),
        _ => Err(Error::precondition(format!(
            "value of {} must be one of: {}, got: {}",
            spec.name,
            spec.choices.join(", "),
            value
        ))),
    }
}

fn check_required_if(descriptor: &ResourceDescriptor, params: &ParameterSet) -> Result<()> {
    for rule in descriptor.required_if.iter().filter(|r| r.state == params.state()) {
        let missing: Vec<&str> = rule
            .fields
            .iter()
            .copied()
            .filter(|field| !params.contains(field))
            .collect();
        if !missing.is_empty() {
            return Err(Error::precondition(format!(
                "state is {} but any of the following are missing: {}",
                rule.state,
                missing.join(", ")
            )));
        }
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
