//! Error types for configuration loading and validation.

/// Errors raised while loading or validating `arbor.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value parsed but is not usable.
    #[error("validation error: {0}")]
    ValidationError(String),
}
