//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Property prefix marking a version override (default: "version")
    pub prefix: String,

    /// Separator between prefix, group and artifact (default: ":")
    pub separator: String,

    /// Append overrides that match no dependency (default: true)
    pub inject_missing: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            prefix: "version".to_string(),
            separator: depver_core::DEFAULT_SEPARATOR.to_string(),
            inject_missing: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "prefix": self.prefix,
            "separator": self.separator,
            "inject_missing": self.inject_missing,
            "properties": {}
        })
    }
}
