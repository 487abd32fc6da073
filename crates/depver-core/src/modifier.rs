//! Host extension point.

use crate::model::{BuildModel, BuildRequest};
use crate::report::RewriteReport;
use crate::rewrite::{self, RewriteOptions};
use crate::table::{OverrideTable, TableBuilder};

/// Something that rewrites an effective model during a model-build event.
pub trait ModelModifier {
    /// Modify `model` in place and report what changed.
    fn modify_build(&self, request: &BuildRequest, model: &mut BuildModel) -> RewriteReport;
}

/// Overrides dependency versions from `group:artifact = version` properties.
///
/// Holds the property snapshot it was created with. Every call to
/// [`ModelModifier::modify_build`] builds a fresh table, so consumed flags
/// never carry over from one model to the next.
#[derive(Debug, Clone)]
pub struct DepVersionOverride {
    properties: Vec<(String, String)>,
    builder: TableBuilder,
    options: RewriteOptions,
}

impl DepVersionOverride {
    /// `properties` are already filtered by prefix, with the prefix stripped.
    pub fn new(properties: Vec<(String, String)>) -> Self {
        Self {
            properties,
            builder: TableBuilder::default(),
            options: RewriteOptions::default(),
        }
    }

    pub fn with_builder(mut self, builder: TableBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the table this modifier would apply.
    pub fn table(&self) -> OverrideTable {
        self.builder.build(
            self.properties
                .iter()
                .map(|(name, version)| (name.as_str(), version.as_str())),
        )
    }

    /// Rewrite `model` with a table built by [`DepVersionOverride::table`].
    pub fn apply_table(&self, table: &mut OverrideTable, model: &mut BuildModel) -> RewriteReport {
        rewrite::apply(&mut model.dependencies, table, self.options)
    }
}

impl ModelModifier for DepVersionOverride {
    fn modify_build(&self, _request: &BuildRequest, model: &mut BuildModel) -> RewriteReport {
        let mut table = self.table();
        self.apply_table(&mut table, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dependency;

    fn modifier(pairs: &[(&str, &str)]) -> DepVersionOverride {
        DepVersionOverride::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_modify_build_rewrites_model() {
        let modifier = modifier(&[("junit:junit", "4.10"), ("com.foo:newlib", "2.0")]);
        let mut model = BuildModel::with_dependencies(vec![Dependency::new("junit", "junit", "4.8.1")]);

        let report = modifier.modify_build(&BuildRequest::default(), &mut model);

        assert_eq!(model.dependencies[0].version.as_deref(), Some("4.10"));
        assert_eq!(model.dependencies[1], Dependency::new("com.foo", "newlib", "2.0"));
        assert_eq!(report.overridden_count(), 1);
        assert_eq!(report.injected_count(), 1);
    }

    #[test]
    fn test_each_model_gets_a_fresh_table() {
        let modifier = modifier(&[("com.foo:newlib", "2.0")]);
        let mut first = BuildModel::default();
        let mut second = BuildModel::default();

        modifier.modify_build(&BuildRequest::default(), &mut first);
        let report = modifier.modify_build(&BuildRequest::default(), &mut second);

        assert_eq!(first.dependencies.len(), 1);
        assert_eq!(second.dependencies.len(), 1);
        assert_eq!(report.injected_count(), 1);
    }

    #[test]
    fn test_options_and_separator() {
        let modifier = modifier(&[("g/a", "2.0"), ("n/new", "1.0")])
            .with_builder(TableBuilder::new('/'))
            .with_options(RewriteOptions {
                inject_missing: false,
            });
        let mut model = BuildModel::with_dependencies(vec![Dependency::new("g", "a", "1.0")]);

        let report = modifier.modify_build(&BuildRequest::default(), &mut model);

        assert_eq!(model.dependencies.len(), 1);
        assert_eq!(model.dependencies[0].version.as_deref(), Some("2.0"));
        assert_eq!(report.not_injected_count(), 1);
    }
}
