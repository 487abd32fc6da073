//! Build model types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::table::OverrideKey;

/// A declared dependency of a build model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub group_id: String,

    pub artifact_id: String,

    /// Declared version. None when inherited (parent, BOM, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Any other fields (scope, type, classifier, ...), kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Dependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: Some(version.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn key(&self) -> OverrideKey {
        OverrideKey::new(self.group_id.clone(), self.artifact_id.clone())
    }
}

/// The effective model handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildModel {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Project coordinates, plugins, and whatever else the model carries.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BuildModel {
    pub fn with_dependencies(dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            extra: serde_json::Map::new(),
        }
    }
}

/// Request context of a model-build event. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}
