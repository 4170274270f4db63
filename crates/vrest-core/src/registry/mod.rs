//! Resource kind registry
//!
//! The registry maps resource kind names to their static descriptors, so the
//! module entry point can pick a descriptor by name without hardcoded
//! if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vrest_core::registry::ResourceRegistry;
//!
//! let registry = ResourceRegistry::new();
//! vrest_resources::register(&registry);
//!
//! let descriptor = registry.get("vcenter_vm")?;
//! ```
//!
//! ## Registration
//!
//! Descriptor crates expose a `register()` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ResourceRegistry) {
//!     registry.register(&VCENTER_VM);
//! }
//! ```

use crate::descriptor::ResourceDescriptor;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of resource descriptors
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: RwLock<HashMap<&'static str, &'static ResourceDescriptor>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its kind name
    ///
    /// Registering the same kind twice replaces the previous descriptor.
    pub fn register(&self, descriptor: &'static ResourceDescriptor) {
        let mut resources = self.resources.write().unwrap_or_else(|e| e.into_inner());
        resources.insert(descriptor.kind, descriptor);
    }

    /// Look up a descriptor
    ///
    /// # Returns
    ///
    /// - `Ok(&ResourceDescriptor)`: The registered descriptor
    /// - `Err(Error::Config)`: If the kind is not registered
    pub fn get(&self, kind: &str) -> Result<&'static ResourceDescriptor> {
        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        resources
            .get(kind)
            .copied()
            .ok_or_else(|| Error::config(format!("Unknown resource kind: {}", kind)))
    }

    /// List all registered resource kinds, sorted
    pub fn list_resources(&self) -> Vec<&'static str> {
        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        let mut kinds: Vec<&'static str> = resources.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Check if a resource kind is registered
    pub fn has_resource(&self, kind: &str) -> bool {
        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        resources.contains_key(kind)
    }
}
