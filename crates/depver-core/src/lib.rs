//! Dependency version overrides for build models.
//!
//! Override properties of the form `group:artifact = version` are parsed into an
//! [`OverrideTable`], which [`rewrite::apply`] then uses to pin the versions of a
//! model's declared dependencies, appending any override that matched nothing.

mod error;
mod model;
mod modifier;
mod report;
pub mod rewrite;
mod table;

pub use error::OverrideError;
pub use model::{BuildModel, BuildRequest, Dependency};
pub use modifier::{DepVersionOverride, ModelModifier};
pub use report::{RewriteEvent, RewriteReport};
pub use rewrite::RewriteOptions;
pub use table::{OverrideEntry, OverrideKey, OverrideTable, TableBuilder, DEFAULT_SEPARATOR};
