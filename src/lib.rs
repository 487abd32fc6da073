//! depver - dependency version overrides for build models
//!
//! Reads `version:<group>:<artifact>=<version>` properties from config files,
//! properties files and the command line, and pins (or injects) the matching
//! dependencies of a JSON/TOML build model.

pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod properties;

pub use config::{ConfigError, EffectiveConfig, OverrideSettings};
pub use depver_core::{
    rewrite, BuildModel, BuildRequest, DepVersionOverride, Dependency, ModelModifier,
    OverrideEntry, OverrideError, OverrideKey, OverrideTable, RewriteEvent, RewriteOptions,
    RewriteReport, TableBuilder,
};
pub use manifest::{Manifest, ManifestError, ManifestFormat};
pub use pipeline::{apply_to_file, build_table, ApplySummary, OutputTarget, PipelineError, PropertyInputs};
pub use properties::{PropertyError, PropertySnapshot};
