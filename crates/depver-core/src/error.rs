//! Override errors.

use serde::{Deserialize, Serialize};

/// Recoverable problems found while building an override table.
///
/// These are recorded and logged, never propagated: a bad property must not
/// abort the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideError {
    /// Property name did not split into exactly two non-empty parts.
    #[error("bad version override property: {name}")]
    MalformedKey { name: String },
}

impl OverrideError {
    /// Machine-readable code, e.g. `MALFORMED_KEY:onlyonepart`.
    pub fn to_code(&self) -> String {
        match self {
            OverrideError::MalformedKey { name } => format!("MALFORMED_KEY:{}", name),
        }
    }
}
