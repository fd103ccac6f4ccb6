//! Error types for the Pulse core.

use thiserror::Error;

/// Boxed error returned by module initialisers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a registry or settings backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage engine reported a failure.
    #[cfg(feature = "redb")]
    #[error("registry database error: {0}")]
    Database(#[from] redb::Error),

    /// A stored record could not be encoded or decoded.
    #[error("registry record is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure while preparing the store.
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure that does not fit the variants above.
    #[error("registry backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a backend error with the given message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced while resolving and activating modules.
///
/// [`MissingRequiredDependency`](Self::MissingRequiredDependency) and
/// [`DisabledDependency`](Self::DisabledDependency) describe per-module
/// rejections: they are collected into the activation result and never abort
/// a run on their own.  Every other variant is fatal for the run.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("module '{module}' is missing required dependencies: {}", missing.join(", "))]
    MissingRequiredDependency { module: String, missing: Vec<String> },

    #[error("module '{module}' depends on unavailable modules: {}", disabled.join(", "))]
    DisabledDependency { module: String, disabled: Vec<String> },

    #[error("module dependency cycle detected among: {}", remaining.join(", "))]
    CycleDetected { remaining: Vec<String> },

    #[error("module '{module}' failed to activate: {source}")]
    ActivationFailure {
        module: String,
        #[source]
        source: BoxError,
    },

    #[error("module registry unavailable: {0}")]
    RegistryUnavailable(#[from] StoreError),

    /// Two discovered modules share one name and would collide in the namespace.
    #[error("module name '{name}' was discovered more than once")]
    DuplicateModule { name: String },
}

impl PulseError {
    /// Name of the module the error is about, when there is exactly one.
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredDependency { module, .. }
            | Self::DisabledDependency { module, .. }
            | Self::ActivationFailure { module, .. } => Some(module),
            Self::DuplicateModule { name } => Some(name),
            Self::CycleDetected { .. } | Self::RegistryUnavailable(_) => None,
        }
    }
}

/// Result type for resolution and activation.
pub type PulseResult<T> = Result<T, PulseError>;
