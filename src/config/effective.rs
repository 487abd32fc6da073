//! Effective configuration with provenance
//!
//! Captures the merged configuration plus where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use depver_core::{RewriteOptions, TableBuilder};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::manifest::{digest_bytes, toml_to_json};

/// Schema identifier
pub const SCHEMA_ID: &str = "depver/effective_config@1";

/// Repo config file name, looked up in the working directory
pub const REPO_CONFIG_FILE: &str = ".depver.toml";

/// Host config location (~/.config/depver/config.toml), if HOME is set
pub fn default_host_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/depver/config.toml"))
}

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Host,
    Repo,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Everything the override pass needs from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSettings {
    /// Full prefix including the trailing separator, e.g. `version:`
    pub property_prefix: String,
    pub separator: char,
    pub inject_missing: bool,
    /// Property definitions from config files, in key order
    pub properties: Vec<(String, String)>,
}

impl OverrideSettings {
    pub fn table_builder(&self) -> TableBuilder {
        TableBuilder::new(self.separator)
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            inject_missing: self.inject_missing,
        }
    }
}

/// Effective configuration with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers. Missing files are skipped.
    pub fn build(
        host_config_path: Option<&Path>,
        repo_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (ConfigOrigin::Host, host_config_path),
            (ConfigOrigin::Repo, repo_config_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = Self::load_toml_file(path)?;
            log::debug!("Loaded {:?} config from {}", origin, path.display());
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        Ok(Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let digest = digest_bytes(&bytes);

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((toml_to_json(toml_value), digest))
    }

    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        match config.get("prefix") {
            Some(Value::String(_)) => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "prefix must be a string".to_string(),
                ))
            }
        }

        match config.get("separator").and_then(Value::as_str) {
            Some(sep) if sep.chars().count() == 1 => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "separator must be exactly one character".to_string(),
                ))
            }
        }

        if !matches!(config.get("inject_missing"), Some(Value::Bool(_))) {
            return Err(ConfigError::ValidationError(
                "inject_missing must be a boolean".to_string(),
            ));
        }

        match config.get("properties") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                if let Some((key, _)) = map.iter().find(|(_, v)| !v.is_string()) {
                    return Err(ConfigError::ValidationError(format!(
                        "properties.{} must be a string",
                        key
                    )));
                }
            }
            Some(_) => {
                return Err(ConfigError::ValidationError(
                    "properties must be a table".to_string(),
                ))
            }
        }

        Ok(())
    }

    /// Typed view of the override-related keys
    pub fn override_settings(&self) -> OverrideSettings {
        let defaults = BuiltinDefaults::default();
        let prefix = self.get_str("prefix").unwrap_or(&defaults.prefix);
        let separator = self
            .get_str("separator")
            .and_then(|s| s.chars().next())
            .unwrap_or(depver_core::DEFAULT_SEPARATOR);

        let properties = self
            .get("properties")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        OverrideSettings {
            property_prefix: format!("{}{}", prefix, separator),
            separator,
            inject_missing: self
                .get_bool("inject_missing")
                .unwrap_or(defaults.inject_missing),
            properties,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
