//! Configuration for the Pulse runtime.
//!
//! Layered loading (defaults, files, environment, overrides) and validation
//! of [`PulseConfig`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, PulseConfig, RegistryConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
