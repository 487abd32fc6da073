//! Test fixtures for the override corpus
//!
//! Each case is (properties, dependencies, expected dependencies + event codes).

use depver::Dependency;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path to the override corpus fixture
pub fn override_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/override_corpus/corpus.json")
}

/// Override test case from corpus.json
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OverrideTestCase {
    pub id: String,
    pub description: String,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub expected: OverrideExpectation,
}

/// Expected rewrite result
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OverrideExpectation {
    pub dependencies: Vec<Dependency>,
    pub codes: Vec<String>,
    #[serde(default)]
    pub skipped: Vec<String>,
}

/// Full override corpus
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OverrideCorpus {
    pub cases: Vec<OverrideTestCase>,
}

/// Load the override corpus
pub fn load_override_corpus() -> OverrideCorpus {
    let contents = std::fs::read_to_string(override_corpus_path())
        .expect("Failed to read override corpus");
    serde_json::from_str(&contents).expect("Failed to parse override corpus")
}
