// # vrest-resources
//
// Built-in resource descriptors. Each resource kind is a static table; the
// generic reconciler in `vrest-core` does the rest.
//
// | Kind                         | States                                   |
// |------------------------------|------------------------------------------|
// | `appliance_networking_proxy` | set (default), absent, test              |
// | `vcenter_vm`                 | present (default), absent, clone,        |
// |                              | instant_clone, register, relocate,       |
// |                              | unregister                               |

pub mod appliance_networking_proxy;
pub mod vcenter_vm;

pub use appliance_networking_proxy::APPLIANCE_NETWORKING_PROXY;
pub use vcenter_vm::VCENTER_VM;

use vrest_core::ResourceRegistry;

/// Register every built-in resource kind
///
/// # Example
///
/// ```rust
/// use vrest_core::ResourceRegistry;
///
/// let registry = ResourceRegistry::new();
/// vrest_resources::register(&registry);
/// assert!(registry.has_resource("vcenter_vm"));
/// ```
pub fn register(registry: &ResourceRegistry) {
    registry.register(&APPLIANCE_NETWORKING_PROXY);
    registry.register(&VCENTER_VM);
}

/// A registry holding every built-in resource kind
pub fn builtin_registry() -> ResourceRegistry {
    let registry = ResourceRegistry::new();
    register(&registry);
    registry
}
