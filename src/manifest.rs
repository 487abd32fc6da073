//! Build model file I/O
//!
//! A model file is JSON or TOML holding a `dependencies` array plus whatever
//! else the model carries. The format is picked from the file extension.
//!
//! The parsed document is kept next to the typed model. Saving writes the
//! document back with only dependency versions patched and injected entries
//! appended. Everything else in the file is written back as it was loaded.

use depver_core::{BuildModel, Dependency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk format of a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from a path's extension (anything but `.toml` is JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ManifestFormat::Toml,
            _ => ManifestFormat::Json,
        }
    }
}

/// Parsed model file, as written by its author
#[derive(Debug, Clone)]
enum Document {
    Json(Value),
    Toml(toml::Table),
}

impl Document {
    fn parse(contents: &str, format: ManifestFormat) -> Result<Self, ManifestError> {
        match format {
            ManifestFormat::Json => serde_json::from_str(contents)
                .map(Document::Json)
                .map_err(|e| ManifestError::ParseError(format!("JSON parse error: {}", e))),
            ManifestFormat::Toml => toml::from_str(contents)
                .map(Document::Toml)
                .map_err(|e| ManifestError::ParseError(format!("TOML parse error: {}", e))),
        }
    }

    fn to_model(&self) -> Result<BuildModel, ManifestError> {
        let value = match self {
            Document::Json(value) => value.clone(),
            Document::Toml(table) => toml_to_json(toml::Value::Table(table.clone())),
        };
        serde_json::from_value(value)
            .map_err(|e| ManifestError::ParseError(format!("invalid model: {}", e)))
    }

    /// Copy of the document carrying `dependencies`.
    ///
    /// The model's dependency list must be the document's list with versions
    /// changed and entries appended, which is all a rewrite pass does.
    fn with_dependencies(&self, dependencies: &[Dependency]) -> Result<Self, ManifestError> {
        match self {
            Document::Json(value) => {
                let mut value = value.clone();
                let root = value.as_object_mut().ok_or_else(|| {
                    ManifestError::SerializeError("model root is not an object".to_string())
                })?;
                if !root.contains_key("dependencies") {
                    if dependencies.is_empty() {
                        return Ok(Document::Json(value));
                    }
                    root.insert("dependencies".to_string(), Value::Array(Vec::new()));
                }
                let Some(Value::Array(existing)) = root.get_mut("dependencies") else {
                    return Err(ManifestError::SerializeError(
                        "dependencies is not an array".to_string(),
                    ));
                };
                for (idx, dependency) in dependencies.iter().enumerate() {
                    match existing.get_mut(idx) {
                        Some(slot) => {
                            if let (Some(entry), Some(version)) =
                                (slot.as_object_mut(), dependency.version.as_ref())
                            {
                                entry.insert("version".to_string(), Value::String(version.clone()));
                            }
                        }
                        None => existing.push(
                            serde_json::to_value(dependency)
                                .map_err(|e| ManifestError::SerializeError(e.to_string()))?,
                        ),
                    }
                }
                Ok(Document::Json(value))
            }
            Document::Toml(table) => {
                let mut table = table.clone();
                if !table.contains_key("dependencies") {
                    if dependencies.is_empty() {
                        return Ok(Document::Toml(table));
                    }
                    table.insert("dependencies".to_string(), toml::Value::Array(Vec::new()));
                }
                let Some(toml::Value::Array(existing)) = table.get_mut("dependencies") else {
                    return Err(ManifestError::SerializeError(
                        "dependencies is not an array".to_string(),
                    ));
                };
                for (idx, dependency) in dependencies.iter().enumerate() {
                    match existing.get_mut(idx) {
                        Some(slot) => {
                            if let (Some(entry), Some(version)) =
                                (slot.as_table_mut(), dependency.version.as_ref())
                            {
                                entry.insert(
                                    "version".to_string(),
                                    toml::Value::String(version.clone()),
                                );
                            }
                        }
                        None => existing.push(
                            toml::Value::try_from(dependency)
                                .map_err(|e| ManifestError::SerializeError(e.to_string()))?,
                        ),
                    }
                }
                Ok(Document::Toml(table))
            }
        }
    }

    fn render(&self) -> Result<String, ManifestError> {
        match self {
            Document::Json(value) => serde_json::to_string_pretty(value)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| ManifestError::SerializeError(e.to_string())),
            Document::Toml(table) => {
                toml::to_string(table).map_err(|e| ManifestError::SerializeError(e.to_string()))
            }
        }
    }
}

/// A model loaded from disk
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub format: ManifestFormat,
    /// SHA-256 digest of the raw bytes as loaded
    pub digest: String,
    pub model: BuildModel,
    document: Document,
}

impl Manifest {
    /// Load and parse a model file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|e| ManifestError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let digest = digest_bytes(&bytes);
        let format = ManifestFormat::from_path(path);

        let contents = String::from_utf8(bytes)
            .map_err(|e| ManifestError::ParseError(format!("Invalid UTF-8: {}", e)))?;
        let document = Document::parse(&contents, format)?;
        let model = document.to_model()?;

        Ok(Self {
            path: path.to_path_buf(),
            format,
            digest,
            model,
            document,
        })
    }

    /// Render the (possibly rewritten) model in its original format
    pub fn render(&self) -> Result<String, ManifestError> {
        self.document
            .with_dependencies(&self.model.dependencies)?
            .render()
    }

    /// Write the model to `path`, or back to where it came from.
    ///
    /// The target's extension must name the model's own format.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ManifestError> {
        let target = path.unwrap_or(self.path.as_path());
        let target_format = ManifestFormat::from_path(target);
        if target_format != self.format {
            return Err(ManifestError::FormatMismatch {
                path: target.display().to_string(),
                expected: self.format,
                found: target_format,
            });
        }

        let rendered = self.render()?;
        fs::write(target, rendered).map_err(|e| ManifestError::IoError {
            path: target.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(target.to_path_buf())
    }
}

/// Parse model text in the given format
pub fn parse_model(contents: &str, format: ManifestFormat) -> Result<BuildModel, ManifestError> {
    Document::parse(contents, format)?.to_model()
}

/// Render a model that has no source document
pub fn render_model(model: &BuildModel, format: ManifestFormat) -> Result<String, ManifestError> {
    match format {
        ManifestFormat::Json => serde_json::to_string_pretty(model)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ManifestError::SerializeError(e.to_string())),
        ManifestFormat::Toml => {
            toml::to_string_pretty(model).map_err(|e| ManifestError::SerializeError(e.to_string()))
        }
    }
}

pub(crate) fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Convert TOML Value to JSON Value (datetimes become strings)
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Model file errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot access {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializeError(String),

    #[error("cannot write {expected:?} model to {path} (extension implies {found:?})")]
    FormatMismatch {
        path: String,
        expected: ManifestFormat,
        found: ManifestFormat,
    },
}
