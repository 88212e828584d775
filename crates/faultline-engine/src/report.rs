//! Operation outcomes
//!
//! Everything the harness hands back serializes to JSON so the CLI's
//! `--json` mode and embedding pipelines consume the same shapes.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use faultline_backup::RestoreSummary;
use faultline_registry::{FaultCategory, FaultDefinition, FaultKind, Severity};

/// What an injection did and what the build should now show.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionReport {
    /// The injected fault
    pub fault_type: FaultKind,
    /// Human description from the catalog
    pub description: String,
    /// Error text the build is expected to surface
    pub expected_error: String,
    /// Catalog severity
    pub severity: Severity,
    /// Whether the build is expected to fail outright
    pub build_fails: bool,
    /// Paths overwritten or created, relative to the project root
    pub modified_paths: Vec<PathBuf>,
    /// Number of paths captured in the backup record
    pub backed_up: usize,
    /// When the backup record was committed
    pub injected_at: DateTime<Utc>,
}

/// The fault a backup record says is currently in the tree.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveFault {
    /// The injected fault
    pub fault_type: FaultKind,
    /// When it was injected
    pub injected_at: DateTime<Utc>,
    /// Number of paths its record protects
    pub entry_count: usize,
}

/// Idle-or-active state of a project tree.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessStatus {
    /// The active fault, if a backup record exists
    pub active: Option<ActiveFault>,
}

impl HarnessStatus {
    /// Whether no fault is active.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }
}

/// Result of a restore request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// No fault was active; nothing to do.
    Idle,
    /// A record was replayed.
    Restored {
        /// Per-file outcomes and cleanup state
        summary: RestoreSummary,
    },
}

impl RestoreOutcome {
    /// Whether there was nothing to restore.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, RestoreOutcome::Idle)
    }

    /// The replay summary, if a record was replayed.
    #[must_use]
    pub fn summary(&self) -> Option<&RestoreSummary> {
        match self {
            RestoreOutcome::Idle => None,
            RestoreOutcome::Restored { summary } => Some(summary),
        }
    }
}

/// Catalog entry in listing form.
#[derive(Debug, Clone, Serialize)]
pub struct FaultSummary {
    /// Fault identifier
    pub fault_type: FaultKind,
    /// Pipeline stage the fault breaks
    pub category: FaultCategory,
    /// Catalog severity
    pub severity: Severity,
    /// Whether the build is expected to fail outright
    pub build_fails: bool,
    /// Human description
    pub description: String,
    /// Paths the fault touches
    pub target_paths: Vec<PathBuf>,
}

impl From<&FaultDefinition> for FaultSummary {
    fn from(definition: &FaultDefinition) -> Self {
        Self {
            fault_type: definition.kind,
            category: definition.kind.category(),
            severity: definition.severity,
            build_fails: definition.build_fails,
            description: definition.description.clone(),
            target_paths: definition.target_paths.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_outcome_tags_its_variant() {
        let idle = serde_json::to_value(RestoreOutcome::Idle).unwrap();
        assert_eq!(idle["outcome"], "idle");
    }

    #[test]
    fn fault_summary_carries_catalog_fields() {
        let registry = faultline_registry::FaultRegistry::builtin();
        let def = registry.get(FaultKind::CssSyntaxError).unwrap();
        let summary = FaultSummary::from(def);
        assert_eq!(summary.fault_type, FaultKind::CssSyntaxError);
        assert_eq!(summary.category, FaultCategory::Bundling);
        assert_eq!(summary.target_paths, def.target_paths);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["fault_type"], "css-syntax-error");
        assert_eq!(json["category"], "bundling");
    }

    #[test]
    fn idle_status_knows_it_is_idle() {
        let status = HarnessStatus { active: None };
        assert!(status.is_idle());
        let json = serde_json::to_value(&status).unwrap();
        assert!(json["active"].is_null());
    }
}
