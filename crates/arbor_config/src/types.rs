//! Configuration types deserialized from `arbor.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The whole `arbor.toml` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArborConfig {
    /// Node store behaviour.
    #[serde(default)]
    pub store: StoreConfig,
    /// Cross-unit merge behaviour.
    #[serde(default)]
    pub merge: MergeConfig,
    /// Textual dumps written around a merge.
    #[serde(default)]
    pub dump: DumpConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Memoize structural lookups per `(kind, schema)`.
    #[serde(default = "default_true")]
    pub find_cache: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { find_cache: true }
    }
}

/// `[merge]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Prefix stripped from declaration names before they are keyed, so
    /// `__builtin_memcpy` and `memcpy` denote the same symbol.
    #[serde(default = "default_builtin_prefix")]
    pub builtin_prefix: String,
    /// Upper bound on suffix attempts when renaming a colliding static.
    #[serde(default = "default_rename_limit")]
    pub rename_limit: u32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            builtin_prefix: default_builtin_prefix(),
            rename_limit: default_rename_limit(),
        }
    }
}

/// `[dump]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpConfig {
    /// Directory receiving dump files.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Dump the destination store before each merge.
    #[serde(default)]
    pub before_merge: bool,
    /// Dump the destination store after each merge.
    #[serde(default)]
    pub after_merge: bool,
}

impl DumpConfig {
    /// Returns `true` if any dump is requested.
    pub fn enabled(&self) -> bool {
        self.before_merge || self.after_merge
    }
}

fn default_true() -> bool {
    true
}

fn default_builtin_prefix() -> String {
    "__builtin_".to_string()
}

fn default_rename_limit() -> u32 {
    100_000
}
