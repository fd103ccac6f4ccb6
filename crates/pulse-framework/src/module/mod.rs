//! Module building blocks.
//!
//! A module is described by a [`ModuleEntry`]: the
//! [`ModuleDescriptor`](pulse_core::ModuleDescriptor) that discovery reports,
//! plus an async initializer.  The initializer receives a [`ModuleContext`]
//! and returns something implementing [`ModuleInstance`], which is stored in
//! the namespace under the module's name.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pulse::prelude::*;
//!
//! struct Clock;
//! impl ModuleInstance for Clock {}
//!
//! async fn init(_ctx: ModuleContext) -> Result<Clock, BoxError> {
//!     Ok(Clock)
//! }
//!
//! fn clock() -> ModuleEntry {
//!     define_module! { name: "clock", init: init }
//! }
//!
//! register_module!(CLOCK = clock);
//! ```

mod context;
mod entry;
mod instance;
pub mod macros;

pub use context::ModuleContext;
pub use entry::{InitFn, InitFuture, ModuleEntry};
pub use instance::{AsAny, ModuleInstance, downcast_instance};
