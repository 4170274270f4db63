//! Existence resolution
//!
//! Decides whether the target of an invocation already exists on the server
//! and, if so, resolves its identifier so later requests can be bound.
//!
//! ## Policy
//!
//! 1. The identifier is supplied directly → fetch it; name lookup is skipped
//! 2. Only the natural key is supplied → list with a filter, match, fetch
//! 3. Singleton resource (no identifier field) → probe with the `get` operation
//! 4. Otherwise → not found
//!
//! "Not found" is a valid answer, never an error by itself. A 500 on the
//! fetch is handed back as [`Existence::Failed`]; the caller decides whether
//! it is fatal.

use crate::binder::bind;
use crate::descriptor::{NaturalKey, ResourceDescriptor};
use crate::error::{Error, Result};
use crate::outcome::envelope;
use crate::params::{DesiredState, ParameterSet};
use crate::traits::{RawResponse, Session};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// An existing remote object
#[derive(Debug, Clone, PartialEq)]
pub struct ServerObject {
    /// Opaque server-assigned identifier; `None` for singleton resources
    pub id: Option<String>,
    /// Enveloped representation (`{"value": ..., "id": ...}`)
    pub representation: Value,
}

/// Result of an existence check
#[derive(Debug, Clone, PartialEq)]
pub enum Existence {
    Found(ServerObject),
    NotFound,
    /// The server failed while answering the lookup
    Failed(RawResponse),
}

impl Existence {
    pub fn is_found(&self) -> bool {
        matches!(self, Existence::Found(_))
    }
}

/// Resolves the existence of targets of one resource kind
pub struct ExistenceResolver<'a> {
    session: &'a dyn Session,
    descriptor: &'static ResourceDescriptor,
}

impl<'a> ExistenceResolver<'a> {
    pub fn new(session: &'a dyn Session, descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            session,
            descriptor,
        }
    }

    /// Determine whether the target of `params` exists
    pub async fn resolve(&self, params: &ParameterSet) -> Result<Existence> {
        if let Some(id_field) = self.descriptor.identifier {
            if let Some(id) = params.get(id_field).and_then(scalar_id) {
                debug!(resource = self.descriptor.kind, id = %id, "Identifier supplied, skipping lookup");
                return self.fetch_by_id(params, &id).await;
            }

            return match self.descriptor.natural_key {
                Some(key) if params.contains(key.field) => {
                    match self.lookup_by_natural_key(params, key).await? {
                        Some(id) => self.fetch_by_id(params, &id).await,
                        None => Ok(Existence::NotFound),
                    }
                }
                _ => Ok(Existence::NotFound),
            };
        }

        if self.descriptor.supports("get") {
            return self.probe(params).await;
        }

        Ok(Existence::NotFound)
    }

    /// Fetch the full representation of an object by identifier
    ///
    /// Any other non-2xx answer means the object is not there.
    pub async fn fetch_by_id(&self, params: &ParameterSet, id: &str) -> Result<Existence> {
        let id_field = self.descriptor.identifier.ok_or_else(|| {
            Error::config(format!(
                "Resource '{}' has no identifier field",
                self.descriptor.kind
            ))
        })?;
        let get = self.descriptor.operation("get")?;
        let request = bind(&params.with_value(id_field, id), get)?;
        let url = request.url(self.session.base_url());

        let response = self.session.get(&url).await?;
        if response.status == 500 {
            warn!(url = %url, "Server failed while fetching the object");
            return Ok(Existence::Failed(response));
        }
        if !response.is_success() {
            debug!(url = %url, status = response.status, "Object not found");
            return Ok(Existence::NotFound);
        }

        let mut representation = envelope(response.json_body()?);
        representation.insert("id".to_string(), Value::String(id.to_string()));

        Ok(Existence::Found(ServerObject {
            id: Some(id.to_string()),
            representation: Value::Object(representation),
        }))
    }

    async fn lookup_by_natural_key(&self, params: &ParameterSet, key: NaturalKey) -> Result<Option<String>> {
        let Some(wanted) = params.get(key.field).cloned() else {
            return Ok(None);
        };

        let list = self.descriptor.operation("list")?;
        let mut filter = Map::new();
        filter.insert(key.filter.to_string(), Value::Array(vec![wanted.clone()]));
        let request = bind(&ParameterSet::new(DesiredState::Present, filter), list)?;
        let url = request.url(self.session.base_url());

        let response = self.session.get(&url).await?;
        if !response.is_success() {
            warn!(url = %url, status = response.status, "Listing failed, treating target as absent");
            return Ok(None);
        }

        let found = list_items(response.json_body()?)
            .into_iter()
            .find(|item| item.get(key.field) == Some(&wanted))
            .and_then(|item| item.get(key.id_key).and_then(scalar_id));

        debug!(
            resource = self.descriptor.kind,
            key = %wanted,
            found = found.is_some(),
            "Natural key lookup"
        );

        Ok(found)
    }

    /// Check a singleton resource by reading it
    ///
    /// Only a 404 proves absence.
    async fn probe(&self, params: &ParameterSet) -> Result<Existence> {
        let get = self.descriptor.operation("get")?;
        let request = bind(params, get)?;
        let url = request.url(self.session.base_url());

        let response: RawResponse = self.session.get(&url).await?;
        if response.status == 404 {
            debug!(url = %url, "Probe found nothing");
            return Ok(Existence::NotFound);
        }

        Ok(Existence::Found(ServerObject {
            id: None,
            representation: Value::Object(envelope(response.json_body()?)),
        }))
    }
}

fn list_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
