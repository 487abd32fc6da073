//! Property snapshot and prefix filter
//!
//! Collects `key=value` properties from config tables, properties files and
//! `-D` definitions, then hands the override-bearing ones (those starting with
//! the override prefix) to the table builder with the prefix stripped.

use std::fs;
use std::path::Path;

/// Ordered property definitions. Later definitions of a key win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySnapshot {
    entries: Vec<(String, String)>,
}

impl PropertySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one definition.
    pub fn define(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Add definitions in order.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.define(k, v);
        }
    }

    /// Add a `-D`-style `key=value` definition.
    pub fn define_raw(&mut self, definition: &str) -> Result<(), PropertyError> {
        let (key, value) = parse_definition(definition)?;
        self.define(key, value);
        Ok(())
    }

    /// Add every definition from a properties file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), PropertyError> {
        let contents = fs::read_to_string(path).map_err(|e| PropertyError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed = parse_properties(&contents).map_err(|e| match e {
            PropertyError::InvalidLine { line, content, .. } => PropertyError::InvalidLine {
                path: path.display().to_string(),
                line,
                content,
            },
            other => other,
        })?;
        self.extend(parsed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions whose key starts with `prefix`, with the prefix removed.
    ///
    /// Order is preserved, so a later duplicate still overrides an earlier one
    /// when the table is built.
    pub fn by_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(prefix).map(|name| (name.to_string(), v.clone())))
            .collect()
    }
}

/// Parse a single `key=value` definition.
///
/// Only the first `=` separates key from value; the key is trimmed.
pub fn parse_definition(definition: &str) -> Result<(String, String), PropertyError> {
    let (key, value) = definition
        .split_once('=')
        .ok_or_else(|| PropertyError::InvalidDefinition(definition.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(PropertyError::InvalidDefinition(definition.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse properties-file contents.
///
/// Blank lines and lines starting with `#` or `!` are ignored.
pub fn parse_properties(contents: &str) -> Result<Vec<(String, String)>, PropertyError> {
    let mut pairs = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let pair = parse_definition(line).map_err(|_| PropertyError::InvalidLine {
            path: String::new(),
            line: idx + 1,
            content: raw.to_string(),
        })?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Property source errors
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("invalid property definition (expected key=value): {0}")]
    InvalidDefinition(String),

    #[error("{path}:{line}: invalid property line: {content}")]
    InvalidLine {
        path: String,
        line: usize,
        content: String,
    },

    #[error("cannot read properties file {path}: {message}")]
    IoError { path: String, message: String },
}
