// # vrest-core
//
// Core library for desired-state reconciliation over a virtual-infrastructure
// management REST API.
//
// ## Architecture Overview
//
// Every manageable resource kind follows the same protocol; only the static
// tables differ:
// - **ResourceDescriptor**: Per-kind table of operations and field mappings
// - **Binder**: ParameterSet + operation → RequestSpec
// - **ExistenceResolver**: Does the target exist, and what is its identifier
// - **Reconciler**: One strategy per desired state, issuing requests
// - **Outcome classifier**: Status + body → uniform OutcomeRecord
// - **Session**: Trait for the authenticated transport (implemented elsewhere)
// - **ResourceRegistry**: Kind name → descriptor
//
// ## Design Principles
//
// 1. **Table-Driven**: New resource kinds are new descriptors, not new code
// 2. **Idempotency**: Existence checks and before/after comparison keep
//    repeated invocations from reporting spurious changes
// 3. **Single-Shot**: One sequential chain of requests per invocation, no
//    retries, no cache
// 4. **Library-First**: The module binary is a thin wrapper over this crate

pub mod arguments;
pub mod binder;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod outcome;
pub mod params;
pub mod reconciler;
pub mod registry;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use arguments::{ArgumentSpec, ArgumentType, RequiredIf, validate_arguments};
pub use binder::{RequestSpec, bind};
pub use config::{ConnectionConfig, InvocationConfig};
pub use descriptor::{
    Fields, HttpMethod, NaturalKey, OperationDescriptor, OperationKind, ResourceDescriptor,
};
pub use error::{Error, Result};
pub use outcome::{Diagnostic, OutcomeRecord, classify, envelope};
pub use params::{DesiredState, ParameterSet};
pub use reconciler::{Reconciler, Strategy};
pub use registry::ResourceRegistry;
pub use resolver::{Existence, ExistenceResolver, ServerObject};
pub use traits::{RawResponse, Session, SessionFactory};
