//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/depver/config.toml)
//! 3. Repo config (.depver.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    default_host_config_path, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig,
    OverrideSettings, REPO_CONFIG_FILE,
};
pub use merge::{deep_merge, merge_layers};
