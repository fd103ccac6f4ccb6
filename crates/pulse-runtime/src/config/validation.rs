//! Configuration validation utilities.

use pulse_core::StoreBackend;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, PulseConfig, RegistryConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &PulseConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_registry_config(&config.registry)?;
    validate_module_sections(config)?;
    validate_settings(config)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    for target in logging.filters.keys() {
        if target.is_empty() {
            return Err(ConfigError::validation("Log filter target cannot be empty"));
        }
        if target.contains(|c: char| c.is_whitespace() || c == '=' || c == ',') {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: '{target}'"
            )));
        }
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    Ok(())
}

fn validate_registry_config(registry: &RegistryConfig) -> ConfigResult<()> {
    if registry.backend == StoreBackend::Redb && registry.resolved_path().is_none() {
        return Err(ConfigError::missing_field("registry.path"));
    }
    Ok(())
}

fn validate_module_sections(config: &PulseConfig) -> ConfigResult<()> {
    if config.modules.keys().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::validation(
            "Module configuration section names cannot be empty",
        ));
    }
    Ok(())
}

fn validate_settings(config: &PulseConfig) -> ConfigResult<()> {
    if config.settings.keys().any(|key| key.trim().is_empty()) {
        return Err(ConfigError::validation("Setting keys cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::schema::LogLevel;

    fn memory_config() -> PulseConfig {
        let mut config = PulseConfig::default();
        config.registry.backend = StoreBackend::Memory;
        config
    }

    #[test]
    fn default_memory_config_is_valid() {
        assert!(validate_config(&memory_config()).is_ok());
    }

    #[test]
    fn rejects_bad_filter_target() {
        let mut config = memory_config();
        config
            .logging
            .filters
            .insert("pulse core".into(), LogLevel::Debug);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn file_output_needs_path() {
        let mut config = memory_config();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { ref field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some(PathBuf::from("pulse.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_blank_module_section() {
        let mut config = memory_config();
        config.modules.insert(" ".into(), serde_json::json!({}));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_blank_setting_key() {
        let mut config = memory_config();
        config.settings.insert("motd".into(), serde_json::json!("hi"));
        assert!(validate_config(&config).is_ok());

        config.settings.insert(String::new(), serde_json::json!(1));
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
