//! Desired state → reconciliation strategy

use crate::descriptor::ResourceDescriptor;
use crate::error::{Error, Result};
use crate::params::DesiredState;

/// How one invocation is carried out
///
/// Selected once per invocation from the desired state and the operations
/// the resource kind supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Resolve existence, then create or update
    CreateOrUpdate,
    /// Read, mutate, read again and compare
    Mutate(&'static str),
    /// Resolve existence, delete if present
    Delete,
    /// Single POST to an action endpoint
    Action(&'static str),
}

impl Strategy {
    /// Select the strategy for a state
    ///
    /// # Returns
    ///
    /// - `Ok(Strategy)`: The strategy to run
    /// - `Err(Error::Config)`: The resource kind cannot honor the state
    pub fn select(state: DesiredState, descriptor: &ResourceDescriptor) -> Result<Self> {
        if !descriptor.accepts_state(state) {
            return Err(Error::config(format!(
                "Resource '{}' does not support state '{}'",
                descriptor.kind, state
            )));
        }

        let strategy = match state {
            DesiredState::Present if descriptor.supports("create") => Strategy::CreateOrUpdate,
            DesiredState::Present => Strategy::Mutate("update"),
            DesiredState::Set => Strategy::Mutate("set"),
            DesiredState::Absent => Strategy::Delete,
            DesiredState::Test
            | DesiredState::Clone
            | DesiredState::InstantClone
            | DesiredState::Register
            | DesiredState::Relocate
            | DesiredState::Unregister => Strategy::Action(state.as_str()),
        };

        // Fail before any request if the table lacks the operation
        descriptor.operation(strategy.operation_name())?;

        Ok(strategy)
    }

    /// Primary operation issued by the strategy
    pub fn operation_name(&self) -> &'static str {
        match self {
            Strategy::CreateOrUpdate => "create",
            Strategy::Mutate(op) | Strategy::Action(op) => op,
            Strategy::Delete => "delete",
        }
    }
}
