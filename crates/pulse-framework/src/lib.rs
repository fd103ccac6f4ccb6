//! Activation machinery for the Pulse module system.
//!
//! - [`module`]: module entries, instances, initializer context and the
//!   [`define_module!`] / [`register_module!`] macros
//! - [`discovery`]: where entries come from
//! - [`namespace`]: the live name → instance map
//! - [`manager`]: the activation sequencer

pub mod discovery;
pub mod manager;
pub mod module;
pub mod namespace;

pub use discovery::{Discovery, LinkedDiscovery, MODULES, StaticDiscovery};
pub use manager::{ActivationResult, ModuleManager, ModuleState};
pub use module::{ModuleContext, ModuleEntry, ModuleInstance};
pub use namespace::{ActiveModule, Namespace};

#[doc(hidden)]
pub mod __private {
    pub use linkme;
    pub use pulse_core::{ModuleDescriptor, OptionalDependency};
}
