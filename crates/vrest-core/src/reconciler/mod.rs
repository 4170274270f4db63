//! Reconciler
//!
//! The Reconciler is responsible for:
//! - Selecting one strategy from the desired state
//! - Resolving whether the target already exists
//! - Issuing the request(s) through the session
//! - Handing every branch to the outcome classifier
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐
//! │ ParameterSet │   │ ResourceDescriptor │
//! └──────────────┘   └────────────────────┘
//!         │                    │
//!         └─────────┬──────────┘
//!                   ▼
//!           ┌──────────────┐        ┌─────────────┐
//!           │  Reconciler  │───────▶│   Session   │
//!           └──────────────┘        └─────────────┘
//!         ┌─────────┼───────────┐
//!         ▼         ▼           ▼
//! ┌────────────┐ ┌────────┐ ┌────────────┐
//! │  Resolver  │ │ Binder │ │ Classifier │
//! └────────────┘ └────────┘ └────────────┘
//! ```
//!
//! ## Invocation Flow
//!
//! 1. Strategy selected from the state (configuration error if unsupported)
//! 2. Optional existence check
//! 3. Primary call
//! 4. Optional confirmatory re-read
//! 5. Exactly one [`OutcomeRecord`] or one error
//!
//! Every invocation is a strictly sequential chain of requests. Nothing is
//! retried and nothing is cached between invocations.

pub mod strategy;

pub use strategy::Strategy;

use crate::arguments::secret_fields;
use crate::binder::{RequestSpec, bind};
use crate::descriptor::{OperationKind, ResourceDescriptor};
use crate::error::{Error, Result};
use crate::outcome::{OutcomeRecord, classify};
use crate::params::ParameterSet;
use crate::resolver::{Existence, ExistenceResolver};
use crate::traits::{RawResponse, Session};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Desired-state reconciler for one resource kind
///
/// Cheap to clone; the session is shared, the descriptor is static.
#[derive(Clone)]
pub struct Reconciler {
    session: Arc<dyn Session>,
    descriptor: &'static ResourceDescriptor,
}

impl Reconciler {
    /// Create a reconciler for a resource kind
    pub fn new(session: Arc<dyn Session>, descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            session,
            descriptor,
        }
    }

    /// The resource kind this reconciler manages
    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    /// Reconcile the remote resource with the desired state
    ///
    /// # Returns
    ///
    /// - `Ok(OutcomeRecord)`: The classified result, including remote
    ///   4xx/5xx answers reported as data
    /// - `Err(Error)`: Precondition, configuration, transport or fatal
    ///   remote failure
    pub async fn reconcile(&self, params: &ParameterSet) -> Result<OutcomeRecord> {
        let strategy = Strategy::select(params.state(), self.descriptor)?;

        info!(
            resource = self.descriptor.kind,
            state = %params.state(),
            strategy = ?strategy,
            "Reconciling"
        );
        debug!(
            params = %params.redacted(&secret_fields(self.descriptor)),
            "Invocation parameters"
        );

        let outcome = match strategy {
            Strategy::CreateOrUpdate => self.create_or_update(params).await?,
            Strategy::Mutate(operation) => self.mutate(params, operation).await?,
            Strategy::Delete => self.delete(params).await?,
            Strategy::Action(operation) => self.action(params, operation).await?,
        };

        info!(
            resource = self.descriptor.kind,
            operation = %outcome.diagnostic.operation,
            changed = outcome.changed,
            failed = outcome.failed,
            "Reconciliation finished"
        );

        Ok(outcome)
    }

    fn resolver(&self) -> ExistenceResolver<'_> {
        ExistenceResolver::new(self.session.as_ref(), self.descriptor)
    }

    async fn send(&self, request: &RequestSpec) -> Result<RawResponse> {
        let url = request.url(self.session.base_url());
        let response = self
            .session
            .request(request.method, &url, request.body.as_ref())
            .await?;
        debug!(method = %request.method, url = %url, status = response.status, "Response received");
        Ok(response)
    }

    /// `present`: create when missing, otherwise update or report as-is
    async fn create_or_update(&self, params: &ParameterSet) -> Result<OutcomeRecord> {
        match self.resolver().resolve(params).await? {
            Existence::Found(object) => {
                if self.descriptor.supports("update") {
                    let params = self.with_resolved_id(params, object.id.as_deref());
                    return self.mutate(&params, "update").await;
                }
                info!(resource = self.descriptor.kind, id = ?object.id, "Object already exists");
                Ok(classify(
                    Some(object.representation),
                    200,
                    "get",
                    OperationKind::Read,
                ))
            }
            Existence::Failed(response) => self.lookup_failed(response),
            Existence::NotFound => self.create(params).await,
        }
    }

    /// Issue the create call and re-fetch the full object
    ///
    /// A 500 on either call is fatal.
    async fn create(&self, params: &ParameterSet) -> Result<OutcomeRecord> {
        let request = bind(params, self.descriptor.operation("create")?)?;
        let response = self.send(&request).await?;
        if response.status == 500 {
            return Err(Error::remote_failure(response.status, response.text));
        }

        let mut body = response.json_body()?;
        if matches!(response.status, 200 | 201) {
            match created_id(&body) {
                Some(id) => match self.resolver().fetch_by_id(params, &id).await? {
                    Existence::Found(object) => body = object.representation,
                    Existence::Failed(fetched) => {
                        return Err(Error::remote_failure(fetched.status, fetched.text));
                    }
                    Existence::NotFound => {
                        warn!(id = %id, "Created object could not be fetched back");
                    }
                },
                None => warn!(body = %body, "Create response carried no identifier"),
            }
        }

        Ok(classify(Some(body), response.status, "create", OperationKind::Create))
    }

    /// `set` / `update`: the mutation response does not say whether anything
    /// changed, so the state is read before and after and compared
    async fn mutate(&self, params: &ParameterSet, operation: &'static str) -> Result<OutcomeRecord> {
        let op = self.descriptor.operation(operation)?;
        let request = bind(params, op)?;
        let read = if self.descriptor.supports("get") {
            bind(params, self.descriptor.operation("get")?)?
        } else {
            request.as_read()
        };

        let before = self.send(&read).await?.json_body()?;
        let response = self.send(&request).await?;
        let body = response.json_body()?;
        let after_response = self.send(&read).await?;
        let after = after_response.json_body()?;

        if before == after {
            info!(operation, "Server state unchanged by the request");
            return Ok(classify(
                Some(after),
                after_response.status,
                "get",
                OperationKind::Read,
            ));
        }

        Ok(classify(Some(body), response.status, operation, op.kind))
    }

    /// `absent`: delete only what exists
    async fn delete(&self, params: &ParameterSet) -> Result<OutcomeRecord> {
        let op = self.descriptor.operation("delete")?;

        let params = match self.resolver().resolve(params).await? {
            Existence::NotFound => {
                info!(resource = self.descriptor.kind, "Nothing to delete");
                return Ok(OutcomeRecord::unchanged("delete"));
            }
            Existence::Failed(response) => return self.lookup_failed(response),
            Existence::Found(object) => self.with_resolved_id(params, object.id.as_deref()),
        };

        let request = bind(&params, op)?;
        let response = self.send(&request).await?;
        let body = response.json_body()?;

        Ok(classify(Some(body), response.status, "delete", op.kind))
    }

    /// Action endpoints (`test`, `clone`, `relocate`, ...)
    async fn action(&self, params: &ParameterSet, operation: &'static str) -> Result<OutcomeRecord> {
        let op = self.descriptor.operation(operation)?;

        let params = match self.descriptor.identifier {
            Some(id_field) if op.fields.uses_path_field(id_field) && !params.contains(id_field) => {
                match self.resolver().resolve(params).await? {
                    Existence::Found(object) => self.with_resolved_id(params, object.id.as_deref()),
                    Existence::Failed(response) => return self.lookup_failed(response),
                    Existence::NotFound => params.clone(),
                }
            }
            _ => params.clone(),
        };

        let request = bind(&params, op)?;
        let response = self.send(&request).await?;
        let body = response.json_body()?;

        Ok(classify(Some(body), response.status, operation, op.kind))
    }

    /// A failed existence lookup, reported as the outcome of the GET
    fn lookup_failed(&self, response: RawResponse) -> Result<OutcomeRecord> {
        warn!(
            resource = self.descriptor.kind,
            status = response.status,
            "Existence lookup failed"
        );
        let body = if response.is_json() || response.text.trim().is_empty() {
            response.json_body()?
        } else {
            Value::String(response.text)
        };
        Ok(classify(Some(body), response.status, "get", OperationKind::Read))
    }

    fn with_resolved_id(&self, params: &ParameterSet, id: Option<&str>) -> ParameterSet {
        match (self.descriptor.identifier, id) {
            (Some(field), Some(id)) => params.with_value(field, id),
            _ => params.clone(),
        }
    }
}

/// Identifier returned by a create call
///
/// Newer servers answer with a bare string, older ones with `{"value": id}`;
/// some wrap the id in a single-entry object.
fn created_id(body: &Value) -> Option<String> {
    match body {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => match map.get("value") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => None,
            None => map.values().next().and_then(Value::as_str).map(str::to_string),
        },
        _ => None,
    }
}
