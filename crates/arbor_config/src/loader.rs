//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ArborConfig;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "arbor.toml";

/// Loads and validates `<dir>/arbor.toml`.
pub fn load_config(dir: &Path) -> Result<ArborConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<ArborConfig, ConfigError> {
    let config: ArborConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ArborConfig) -> Result<(), ConfigError> {
    if config.merge.rename_limit == 0 {
        return Err(ConfigError::ValidationError(
            "merge.rename_limit must be positive".to_string(),
        ));
    }
    if config.dump.enabled() && config.dump.directory.is_none() {
        return Err(ConfigError::ValidationError(
            "dump.directory is required when a dump is enabled".to_string(),
        ));
    }
    Ok(())
}
