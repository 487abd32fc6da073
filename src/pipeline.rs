//! Override pipeline
//!
//! config + property sources -> override table -> model rewrite -> summary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use depver_core::{DepVersionOverride, OverrideError, OverrideTable, RewriteReport};

use crate::config::{ConfigError, ConfigSource, EffectiveConfig, OverrideSettings};
use crate::manifest::{Manifest, ManifestError};
use crate::properties::{PropertyError, PropertySnapshot};

/// Schema identifier for apply summaries
pub const SUMMARY_SCHEMA_ID: &str = "depver/apply_summary@1";

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("property error: {0}")]
    Property(#[from] PropertyError),

    #[error("model error: {0}")]
    Manifest(#[from] ManifestError),
}

/// Where override properties come from, lowest precedence first
#[derive(Debug, Clone, Default)]
pub struct PropertyInputs {
    /// Properties files, applied in order
    pub files: Vec<PathBuf>,
    /// `-D key=value` definitions, applied last
    pub definitions: Vec<String>,
}

/// Gather the property snapshot: config tables, then files, then definitions.
pub fn collect_properties(
    settings: &OverrideSettings,
    inputs: &PropertyInputs,
) -> Result<PropertySnapshot, PipelineError> {
    let mut snapshot = PropertySnapshot::new();
    snapshot.extend(settings.properties.iter().cloned());
    for file in &inputs.files {
        snapshot.load_file(file)?;
    }
    for definition in &inputs.definitions {
        snapshot.define_raw(definition)?;
    }
    Ok(snapshot)
}

/// The modifier configured by `settings` over the override properties in `snapshot`.
pub fn override_modifier(settings: &OverrideSettings, snapshot: &PropertySnapshot) -> DepVersionOverride {
    DepVersionOverride::new(snapshot.by_prefix(&settings.property_prefix))
        .with_builder(settings.table_builder())
        .with_options(settings.rewrite_options())
}

/// Summary of one apply run (printed with --json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySummary {
    pub schema_id: String,

    pub created_at: DateTime<Utc>,

    pub model_path: String,

    /// Digest of the model file before rewriting
    pub model_digest: String,

    /// Where the rewritten model went (None for dry runs or stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,

    pub overrides: usize,

    /// Malformed override properties that were ignored
    #[serde(default)]
    pub skipped: Vec<OverrideError>,

    pub report: RewriteReport,

    pub config_sources: Vec<ConfigSource>,
}

impl ApplySummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary
    pub fn to_human(&self) -> String {
        let mut out = format!(
            "{}: {} override(s), {} changed, {} already current, {} injected",
            self.model_path,
            self.overrides,
            self.report.overridden_count(),
            self.report.unchanged_count(),
            self.report.injected_count(),
        );
        if self.report.not_injected_count() > 0 {
            out.push_str(&format!(", {} not injected", self.report.not_injected_count()));
        }
        for code in self.report.event_codes() {
            out.push_str("\n  ");
            out.push_str(&code);
        }
        for skipped in &self.skipped {
            out.push_str("\n  ");
            out.push_str(&skipped.to_code());
        }
        if let Some(ref path) = self.written_to {
            out.push_str(&format!("\nWrote {}", path));
        }
        out
    }
}

/// Result of [`apply_to_file`]
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub manifest: Manifest,
    pub summary: ApplySummary,
}

/// Output destination for the rewritten model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Overwrite the input file
    InPlace,
    /// Write to another file
    File(PathBuf),
    /// Leave writing to the caller (stdout, dry run)
    None,
}

/// Load `model_path`, rewrite it and write it to `output`.
pub fn apply_to_file(
    config: &EffectiveConfig,
    inputs: &PropertyInputs,
    model_path: &Path,
    output: &OutputTarget,
) -> Result<ApplyOutcome, PipelineError> {
    let settings = config.override_settings();
    let snapshot = collect_properties(&settings, inputs)?;
    let modifier = override_modifier(&settings, &snapshot);
    let mut manifest = Manifest::load(model_path)?;
    let model_digest = manifest.digest.clone();

    let mut table = modifier.table();
    let report = modifier.apply_table(&mut table, &mut manifest.model);

    let written_to = match output {
        OutputTarget::InPlace => Some(manifest.save(None)?),
        OutputTarget::File(path) => Some(manifest.save(Some(path.as_path()))?),
        OutputTarget::None => None,
    };

    let summary = ApplySummary {
        schema_id: SUMMARY_SCHEMA_ID.to_string(),
        created_at: Utc::now(),
        model_path: model_path.display().to_string(),
        model_digest,
        written_to: written_to.map(|p| p.display().to_string()),
        overrides: table.len(),
        skipped: table.skipped().to_vec(),
        report,
        config_sources: config.sources.clone(),
    };

    Ok(ApplyOutcome { manifest, summary })
}

/// Build only the override table, for inspection.
pub fn build_table(
    config: &EffectiveConfig,
    inputs: &PropertyInputs,
) -> Result<OverrideTable, PipelineError> {
    let settings = config.override_settings();
    let snapshot = collect_properties(&settings, inputs)?;
    Ok(override_modifier(&settings, &snapshot).table())
}
