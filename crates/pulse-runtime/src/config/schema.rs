//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use pulse_core::StoreBackend;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PulseConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the module registry lives.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Per-module configuration sections, keyed by module name.
    ///
    /// Each section is handed verbatim to the module's initializer.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,

    /// Settings written to the store when the runtime is built.
    ///
    /// Existing keys are overwritten; keys not listed are kept.
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Newline-delimited JSON; requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Write to `logging.file_path`.
    File,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level; `RUST_LOG` wins when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file for [`LogOutput::File`].
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Include thread IDs in each line.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in each line.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target level overrides, e.g. `pulse_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

// =============================================================================
// Registry
// =============================================================================

/// Registry store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database file for the redb backend.
    ///
    /// Defaults to `<data dir>/pulse/registry.redb`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RegistryConfig {
    /// The database path in effect: the configured one, or the default under
    /// the user data directory when that can be determined.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("pulse").join("registry.redb")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PulseConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.registry.backend, StoreBackend::Redb);
        assert!(config.modules.is_empty());
        assert!(config.settings.is_empty());
    }

    #[test]
    fn explicit_registry_path_wins() {
        let registry = RegistryConfig {
            backend: StoreBackend::Redb,
            path: Some(PathBuf::from("/tmp/custom.redb")),
        };
        assert_eq!(
            registry.resolved_path(),
            Some(PathBuf::from("/tmp/custom.redb"))
        );
    }

    #[test]
    fn deserializes_from_json_shape() {
        let config: PulseConfig = serde_json::from_value(serde_json::json!({
            "logging": { "level": "debug", "filters": { "pulse_core": "trace" } },
            "registry": { "backend": "memory" },
            "modules": { "greeter": { "greeting": "hey" } },
            "settings": { "motd": "welcome" }
        }))
        .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.filters["pulse_core"], LogLevel::Trace);
        assert_eq!(config.registry.backend, StoreBackend::Memory);
        assert_eq!(config.modules["greeter"]["greeting"], "hey");
        assert_eq!(config.settings["motd"], "welcome");
    }
}
