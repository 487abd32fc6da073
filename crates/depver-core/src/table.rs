//! Override table and its builder.
//!
//! The table is a two-level map, group ID -> artifact ID -> entry. It is built
//! once from a property snapshot and then consumed by a single rewrite pass.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::OverrideError;

/// Separator between group and artifact in a property name.
pub const DEFAULT_SEPARATOR: char = ':';

/// Coordinate pair identifying a dependency, independent of version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverrideKey {
    group_id: String,
    artifact_id: String,
}

impl OverrideKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Key as it appears in a property name, joined with `separator`.
    pub fn to_property_name(&self, separator: char) -> String {
        format!("{}{}{}", self.group_id, separator, self.artifact_id)
    }
}

/// Always `group:artifact`, whatever separator the table was built with.
/// Event codes and logs use this form.
impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A desired version for one coordinate, plus whether a rewrite pass used it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    key: OverrideKey,
    version: String,
    consumed: bool,
}

impl OverrideEntry {
    pub fn new(key: OverrideKey, version: impl Into<String>) -> Self {
        Self {
            key,
            version: version.into(),
            consumed: false,
        }
    }

    pub fn key(&self) -> &OverrideKey {
        &self.key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub(crate) fn mark_consumed(&mut self) {
        self.consumed = true;
    }
}

/// Lookup table of overrides: group ID -> artifact ID -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTable {
    groups: BTreeMap<String, BTreeMap<String, OverrideEntry>>,

    /// Properties rejected while building this table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<OverrideError>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous entry for the same coordinate.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: OverrideEntry) -> Option<OverrideEntry> {
        self.groups
            .entry(entry.key.group_id.clone())
            .or_default()
            .insert(entry.key.artifact_id.clone(), entry)
    }

    pub fn get(&self, group_id: &str, artifact_id: &str) -> Option<&OverrideEntry> {
        self.groups.get(group_id)?.get(artifact_id)
    }

    pub(crate) fn get_mut(&mut self, group_id: &str, artifact_id: &str) -> Option<&mut OverrideEntry> {
        self.groups.get_mut(group_id)?.get_mut(artifact_id)
    }

    /// Number of entries across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries, group then artifact.
    pub fn entries(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.groups.values().flat_map(BTreeMap::values)
    }

    /// Entries not yet matched or injected.
    pub fn unconsumed(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.entries().filter(|e| !e.consumed)
    }

    pub fn all_consumed(&self) -> bool {
        self.entries().all(OverrideEntry::is_consumed)
    }

    /// Malformed properties seen while building.
    pub fn skipped(&self) -> &[OverrideError] {
        &self.skipped
    }
}

/// Builds an [`OverrideTable`] from prefix-stripped property names.
#[derive(Debug, Clone, Copy)]
pub struct TableBuilder {
    separator: char,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl TableBuilder {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Build a table from `(property name, version)` pairs.
    ///
    /// Names must look like `group<sep>artifact`. Anything else is skipped and
    /// logged; later pairs for the same coordinate replace earlier ones.
    pub fn build<I, K, V>(&self, properties: I) -> OverrideTable
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table = OverrideTable::new();

        for (name, version) in properties {
            let name = name.as_ref();
            let Some(key) = self.parse_key(name) else {
                error!("Detected bad version override property. Name: {}", name);
                table.skipped.push(OverrideError::MalformedKey {
                    name: name.to_string(),
                });
                continue;
            };

            let version = version.into();
            debug!(
                "Detected version override property. Group: {}  ArtifactID: {}  Target Version: {}",
                key.group_id, key.artifact_id, version
            );

            if let Some(previous) = table.insert(OverrideEntry::new(key, version)) {
                debug!(
                    "Override for {} replaced (was {})",
                    previous.key, previous.version
                );
            }
        }

        if table.is_empty() {
            debug!("No version overrides.");
        }

        table
    }

    fn parse_key(&self, name: &str) -> Option<OverrideKey> {
        let mut parts = name.split(self.separator);
        let group = parts.next()?;
        let artifact = parts.next()?;
        if parts.next().is_some() || group.is_empty() || artifact.is_empty() {
            return None;
        }
        Some(OverrideKey::new(group, artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_single_override() {
        let table = TableBuilder::default().build(props(&[("junit:junit", "4.10")]));
        assert_eq!(table.len(), 1);
        let entry = table.get("junit", "junit").unwrap();
        assert_eq!(entry.version(), "4.10");
        assert!(!entry.is_consumed());
        assert!(table.skipped().is_empty());
    }

    #[test]
    fn test_build_groups_artifacts() {
        let table = TableBuilder::default().build(props(&[
            ("org.foo:a", "1.0"),
            ("org.foo:b", "2.0"),
            ("org.bar:a", "3.0"),
        ]));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("org.foo", "b").unwrap().version(), "2.0");
        assert_eq!(table.get("org.bar", "a").unwrap().version(), "3.0");
        assert!(table.get("org.bar", "b").is_none());
        assert!(table.get("org.baz", "a").is_none());
    }

    #[test]
    fn test_single_part_is_malformed() {
        let table = TableBuilder::default().build(props(&[("onlyonepart", "1.0")]));
        assert!(table.is_empty());
        assert_eq!(
            table.skipped(),
            &[OverrideError::MalformedKey {
                name: "onlyonepart".to_string()
            }]
        );
    }

    #[test]
    fn test_three_parts_is_malformed() {
        let table = TableBuilder::default().build(props(&[("a:b:c", "1.0"), ("x:y", "2.0")]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped().len(), 1);
        assert_eq!(table.skipped()[0].to_code(), "MALFORMED_KEY:a:b:c");
    }

    #[test]
    fn test_empty_parts_are_malformed() {
        let table = TableBuilder::default().build(props(&[
            (":artifact", "1.0"),
            ("group:", "1.0"),
            ("", "1.0"),
            ("a::b", "1.0"),
        ]));
        assert!(table.is_empty());
        assert_eq!(table.skipped().len(), 4);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let table = TableBuilder::default().build(props(&[
            ("junit:junit", "4.8"),
            ("junit:junit", "4.10"),
        ]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("junit", "junit").unwrap().version(), "4.10");
        assert!(table.skipped().is_empty());
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let table = TableBuilder::default().build(Vec::<(String, String)>::new());
        assert!(table.is_empty());
        assert!(table.all_consumed());
    }

    #[test]
    fn test_custom_separator() {
        let table = TableBuilder::new('/').build(props(&[("org.foo/bar", "1.0"), ("org.foo:bar", "2.0")]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("org.foo", "bar").unwrap().version(), "1.0");
        assert_eq!(table.skipped().len(), 1);
    }

    #[test]
    fn test_insert_returns_replaced() {
        let mut table = OverrideTable::new();
        assert!(table
            .insert(OverrideEntry::new(OverrideKey::new("g", "a"), "1"))
            .is_none());
        let replaced = table
            .insert(OverrideEntry::new(OverrideKey::new("g", "a"), "2"))
            .unwrap();
        assert_eq!(replaced.version(), "1");
        assert_eq!(table.get("g", "a").unwrap().version(), "2");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(OverrideKey::new("junit", "junit").to_string(), "junit:junit");
    }

    #[test]
    fn test_property_name_uses_separator() {
        let table = TableBuilder::new('/').build(props(&[("org.foo/bar", "1.0")]));
        let key = table.entries().next().unwrap().key();
        assert_eq!(key.to_property_name('/'), "org.foo/bar");
        assert_eq!(key.to_string(), "org.foo:bar");
    }

    #[test]
    fn test_unconsumed_tracks_marked_entries() {
        let mut table = TableBuilder::default().build(props(&[("g:a", "1"), ("g:b", "2")]));
        assert_eq!(table.unconsumed().count(), 2);

        table.get_mut("g", "a").unwrap().mark_consumed();

        let pending: Vec<_> = table.unconsumed().map(|e| e.key().to_string()).collect();
        assert_eq!(pending, vec!["g:b"]);
        assert!(!table.all_consumed());
    }

    #[test]
    fn test_table_serialization() {
        let table = TableBuilder::default().build(props(&[("g:a", "1.0"), ("bad", "x")]));
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"version\":\"1.0\""));
        assert!(json.contains("MALFORMED_KEY"));
    }
}
