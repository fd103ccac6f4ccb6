//! Runtime error types.

use pulse_core::{PulseError, StoreError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An activation run failed.
    #[error(transparent)]
    Activation(#[from] PulseError),

    /// The registry or settings store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The name has no registry entry.
    #[error("Module not registered: {0}")]
    UnknownModule(String),

    /// A setting could not be converted to or from the requested type.
    #[error("Invalid value for setting '{key}': {source}")]
    Setting {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Installing a shutdown signal handler failed.
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
