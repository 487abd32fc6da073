//! Two-pass dependency rewrite.
//!
//! Pass 1 walks the existing dependencies in order and pins every one that has
//! an override. Pass 2 appends a dependency for each override pass 1 did not
//! use. Every entry of the table is consumed once the call returns.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::Dependency;
use crate::report::{RewriteEvent, RewriteReport};
use crate::table::{OverrideKey, OverrideTable};

/// Knobs for a rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
    /// Append dependencies for overrides that matched nothing.
    pub inject_missing: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            inject_missing: true,
        }
    }
}

/// Apply `table` to `dependencies` in place.
///
/// Existing dependencies keep their relative order; injected ones are appended
/// after them, in table order.
pub fn apply(
    dependencies: &mut Vec<Dependency>,
    table: &mut OverrideTable,
    options: RewriteOptions,
) -> RewriteReport {
    let mut report = RewriteReport {
        original_count: dependencies.len(),
        events: Vec::new(),
    };

    override_existing(dependencies, table, &mut report);
    inject_missing(dependencies, table, options, &mut report);

    report
}

fn override_existing(
    dependencies: &mut [Dependency],
    table: &mut OverrideTable,
    report: &mut RewriteReport,
) {
    for dependency in dependencies.iter_mut() {
        let Some(entry) = table.get_mut(&dependency.group_id, &dependency.artifact_id) else {
            continue;
        };

        // An absent version never equals an override.
        if dependency.version.as_deref() == Some(entry.version()) {
            debug!(
                "Version of ArtifactID {} was the same as the override version (both are {})",
                dependency.artifact_id,
                entry.version()
            );
            report.events.push(RewriteEvent::AlreadyAtVersion {
                key: entry.key().clone(),
                version: entry.version().to_string(),
            });
        } else {
            let from = dependency.version.replace(entry.version().to_string());
            debug!(
                "Version of ArtifactID {} was overridden from {} to {}",
                dependency.artifact_id,
                from.as_deref().unwrap_or("<none>"),
                entry.version()
            );
            report.events.push(RewriteEvent::Overridden {
                key: entry.key().clone(),
                from,
                to: entry.version().to_string(),
            });
        }

        entry.mark_consumed();
    }
}

fn inject_missing(
    dependencies: &mut Vec<Dependency>,
    table: &mut OverrideTable,
    options: RewriteOptions,
    report: &mut RewriteReport,
) {
    let pending: Vec<OverrideKey> = table.unconsumed().map(|e| e.key().clone()).collect();

    for key in pending {
        let Some(entry) = table.get_mut(key.group_id(), key.artifact_id()) else {
            continue;
        };
        let version = entry.version().to_string();

        if options.inject_missing {
            dependencies.push(Dependency::new(
                key.group_id(),
                key.artifact_id(),
                version.clone(),
            ));
            debug!("New dependency added: {}={}", key, version);
            report.events.push(RewriteEvent::Injected { key, version });
        } else {
            debug!("Override {}={} matched no dependency, not injected", key, version);
            report.events.push(RewriteEvent::NotInjected { key, version });
        }

        entry.mark_consumed();
    }
}
