//! # Pulse
//!
//! Dependency-aware module loading for Rust applications.
//!
//! ## Overview
//!
//! Modules declare a name, version and the modules they depend on.  On every
//! start Pulse discovers them, checks their dependencies against a durable
//! registry of enabled/disabled flags, orders them so dependencies come first
//! and activates them into a shared namespace.
//!
//! ```text
//! ┌───────────┐    ┌──────────────┐    ┌─────────────┐    ┌──────────────┐
//! │ Discovery │───▶│ Graph + sort │───▶│ Activation  │───▶│  Namespace   │
//! └───────────┘    └──────────────┘    └─────────────┘    └──────────────┘
//!                         ▲                   │
//!                         └──── Registry ◀────┘
//! ```
//!
//! - **Discovery**: link-time (`register_module!`) or static lists
//! - **Registry**: enabled flags and descriptor snapshots (redb or memory)
//! - **Activation**: sequential, dependencies first; each initializer sees
//!   everything activated before it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pulse::prelude::*;
//!
//! struct Storage;
//! impl ModuleInstance for Storage {}
//!
//! fn storage() -> ModuleEntry {
//!     define_module! {
//!         name: "storage",
//!         init: |_ctx: ModuleContext| async { Ok::<_, BoxError>(Storage) },
//!     }
//! }
//!
//! register_module!(STORAGE = storage);
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     PulseRuntime::load()?.run().await
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): read `pulse.toml`
//! - `yaml-config`: read `pulse.yaml`
//! - `json-log`: JSON log lines
//! - `redb` (default): durable on-disk registry

pub use pulse_core as core;
pub use pulse_framework as framework;
pub use pulse_runtime as runtime;

pub use async_trait::async_trait;
pub use pulse_framework::{define_module, register_module};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use pulse::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use pulse_runtime::{PulseRuntime, RuntimeError, RuntimeResult};

    // Module definition
    pub use crate::async_trait;
    pub use pulse_framework::{
        ModuleContext, ModuleEntry, ModuleInstance, define_module, register_module,
    };

    // Descriptors and errors
    pub use pulse_core::{BoxError, ModuleDescriptor, OptionalDependency, PulseError};

    // Activation results
    pub use pulse_framework::{ActivationResult, ModuleState, Namespace};

    // Logging macros
    pub use pulse_runtime::prelude::*;
}
