//! Configuration for the arbor IR layer, loaded from `arbor.toml`.
//!
//! Every section and key is optional; a missing file section falls back to
//! the defaults documented on each type.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::{ArborConfig, DumpConfig, MergeConfig, StoreConfig};
