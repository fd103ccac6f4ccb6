//! Core types for the Pulse module system.
//!
//! This crate holds everything that does not need an async runtime:
//!
//! - [`ModuleDescriptor`]: what discovery reports about a module
//! - [`store`]: the persistent registry and settings tables
//! - [`GraphBuilder`] and [`topological_order`]: dependency validation and
//!   ordering
//! - [`PulseError`]: the shared error vocabulary
//!
//! The activation machinery lives in `pulse-framework`.

pub mod descriptor;
pub mod error;
pub mod graph;
pub mod sort;
pub mod store;

pub use descriptor::{ModuleDescriptor, OptionalDependency};
pub use error::{BoxError, PulseError, PulseResult, StoreError, StoreResult};
pub use graph::{DependencyGraph, Edge, EdgeKind, GraphBuilder, Rejection};
pub use sort::topological_order;
#[cfg(feature = "redb")]
pub use store::RedbStore;
pub use store::{
    MemoryStore, RegistryEntry, RegistryStore, SettingsStore, Store, StoreBackend, open_store,
};
