//! Pulse Runtime - orchestration layer for the Pulse module system.
//!
//! This crate provides:
//! - Layered configuration loading (`pulse.toml`, profiles, `PULSE_*` env)
//! - Logging setup on `tracing-subscriber`
//! - The [`PulseRuntime`] orchestrator: registry store, activation runs,
//!   registry administration and typed settings
//!
//! ```ignore
//! use pulse_runtime::PulseRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pulse_runtime::RuntimeError> {
//!     let runtime = PulseRuntime::load()?;
//!     runtime.run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, Profile, PulseConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{PulseRuntime, RuntimeBuilder};

// Re-export tracing for use by module crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
