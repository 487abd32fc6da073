//! Rewrite report types.

use serde::{Deserialize, Serialize};

use crate::table::OverrideKey;

/// One decision taken during a rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewriteEvent {
    /// An existing dependency's version was replaced.
    Overridden {
        key: OverrideKey,
        /// Previous version. None when the dependency declared no version.
        from: Option<String>,
        to: String,
    },

    /// An existing dependency already had the override version.
    AlreadyAtVersion { key: OverrideKey, version: String },

    /// A new dependency was appended for an unmatched override.
    Injected { key: OverrideKey, version: String },

    /// An unmatched override was dropped because injection is disabled.
    NotInjected { key: OverrideKey, version: String },
}

impl RewriteEvent {
    pub fn key(&self) -> &OverrideKey {
        match self {
            RewriteEvent::Overridden { key, .. }
            | RewriteEvent::AlreadyAtVersion { key, .. }
            | RewriteEvent::Injected { key, .. }
            | RewriteEvent::NotInjected { key, .. } => key,
        }
    }

    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            RewriteEvent::Overridden { key, from, to } => format!(
                "OVERRIDDEN:{}:{}->{}",
                key,
                from.as_deref().unwrap_or("<none>"),
                to
            ),
            RewriteEvent::AlreadyAtVersion { key, version } => {
                format!("ALREADY_AT_VERSION:{}:{}", key, version)
            }
            RewriteEvent::Injected { key, version } => format!("INJECTED:{}:{}", key, version),
            RewriteEvent::NotInjected { key, version } => {
                format!("NOT_INJECTED:{}:{}", key, version)
            }
        }
    }
}

/// Everything a rewrite pass did, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Dependencies in the model before the pass.
    pub original_count: usize,

    pub events: Vec<RewriteEvent>,
}

impl RewriteReport {
    pub fn overridden_count(&self) -> usize {
        self.count(|e| matches!(e, RewriteEvent::Overridden { .. }))
    }

    pub fn unchanged_count(&self) -> usize {
        self.count(|e| matches!(e, RewriteEvent::AlreadyAtVersion { .. }))
    }

    pub fn injected_count(&self) -> usize {
        self.count(|e| matches!(e, RewriteEvent::Injected { .. }))
    }

    pub fn not_injected_count(&self) -> usize {
        self.count(|e| matches!(e, RewriteEvent::NotInjected { .. }))
    }

    /// True when the model was left exactly as it was.
    pub fn is_noop(&self) -> bool {
        self.overridden_count() == 0 && self.injected_count() == 0
    }

    /// Get events as machine-readable strings.
    pub fn event_codes(&self) -> Vec<String> {
        self.events.iter().map(RewriteEvent::to_code).collect()
    }

    fn count(&self, pred: impl Fn(&RewriteEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(g: &str, a: &str) -> OverrideKey {
        OverrideKey::new(g, a)
    }

    #[test]
    fn test_event_codes() {
        let report = RewriteReport {
            original_count: 2,
            events: vec![
                RewriteEvent::Overridden {
                    key: key("junit", "junit"),
                    from: Some("4.8.1".to_string()),
                    to: "4.10".to_string(),
                },
                RewriteEvent::Overridden {
                    key: key("g", "a"),
                    from: None,
                    to: "1.0".to_string(),
                },
                RewriteEvent::Injected {
                    key: key("com.foo", "newlib"),
                    version: "2.0".to_string(),
                },
            ],
        };
        assert_eq!(
            report.event_codes(),
            vec![
                "OVERRIDDEN:junit:junit:4.8.1->4.10",
                "OVERRIDDEN:g:a:<none>->1.0",
                "INJECTED:com.foo:newlib:2.0",
            ]
        );
        assert_eq!(report.overridden_count(), 2);
        assert_eq!(report.injected_count(), 1);
        assert!(!report.is_noop());
    }

    #[test]
    fn test_noop_report() {
        let report = RewriteReport {
            original_count: 1,
            events: vec![RewriteEvent::AlreadyAtVersion {
                key: key("g", "a"),
                version: "1".to_string(),
            }],
        };
        assert!(report.is_noop());
        assert_eq!(report.unchanged_count(), 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = RewriteEvent::Injected {
            key: key("g", "a"),
            version: "1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"INJECTED\""));
        assert!(json.contains("\"group_id\":\"g\""));
    }
}
