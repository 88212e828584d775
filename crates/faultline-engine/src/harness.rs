//! Fault injection harness
//!
//! [`Harness`] wires the catalog, the template store and the backup store
//! together and enforces the injection ordering: tree checked idle,
//! template validated, originals snapshotted, record committed, only then
//! fault content written. Restore replays the record and verifies digests.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use faultline_backup::{BackupError, BackupStore};
use faultline_registry::{FaultDefinition, FaultKind, FaultRegistry};

use crate::config::HarnessConfig;
use crate::error::{EngineError, EngineResult};
use crate::report::{ActiveFault, FaultSummary, HarnessStatus, InjectionReport, RestoreOutcome};
use crate::template::{TemplateStore, VerifyReport};

/// Injects catalog faults into one project tree and restores them.
///
/// An explicit instance over explicit paths; two harnesses on two
/// project roots are fully independent. All operations take `&self` and
/// derive their state from durable storage, so a harness can outlive any
/// number of inject/restore cycles.
#[derive(Debug)]
pub struct Harness {
    registry: FaultRegistry,
    templates: TemplateStore,
    store: BackupStore,
    project_root: PathBuf,
}

impl Harness {
    /// Open a harness over a project tree with the builtin catalog.
    ///
    /// Only the project root is validated here. Templates are checked
    /// when a fault is injected or [`verify_templates`] runs, never at
    /// open: a tree with an active fault must remain restorable even if
    /// the template directory has meanwhile been damaged.
    ///
    /// [`verify_templates`]: Self::verify_templates
    ///
    /// # Errors
    /// [`EngineError::ProjectRootInvalid`] if the configured project root
    /// does not exist or is not a directory.
    pub fn open(config: HarnessConfig) -> EngineResult<Self> {
        let project_root =
            fs::canonicalize(&config.project_root).map_err(|e| EngineError::ProjectRootInvalid {
                path: config.project_root.clone(),
                reason: e.to_string(),
            })?;
        if !project_root.is_dir() {
            return Err(EngineError::ProjectRootInvalid {
                path: config.project_root.clone(),
                reason: "not a directory".to_owned(),
            });
        }
        let store = BackupStore::new(&project_root, config.backup_storage_path(&project_root));
        let templates = TemplateStore::new(&config.templates_root);
        debug!(
            project_root = %project_root.display(),
            templates = %templates.root().display(),
            "harness opened"
        );
        Ok(Self {
            registry: FaultRegistry::builtin(),
            templates,
            store,
            project_root,
        })
    }

    /// Replace the catalog, e.g. with a partial one in tests.
    #[must_use]
    pub fn with_registry(mut self, registry: FaultRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The catalog this harness injects from.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FaultRegistry {
        &self.registry
    }

    /// Canonicalized root of the project tree.
    #[inline]
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Inject a fault into the project tree.
    ///
    /// Nothing in the tree changes until the definition is resolved, the
    /// tree is confirmed idle, the template is loaded and marker-checked,
    /// every target is snapshotted and the backup record is durable. If
    /// writing fault content then fails partway, the already-committed
    /// record is replayed to put the tree back, and the write error is
    /// returned.
    ///
    /// # Errors
    /// [`EngineError::FaultAlreadyActive`] if a record exists,
    /// [`EngineError::Registry`] for unknown kinds in partial catalogs,
    /// [`EngineError::Template`] for unusable templates,
    /// [`EngineError::Backup`] / [`EngineError::Io`] for storage failures.
    pub fn inject(&self, fault: FaultKind) -> EngineResult<InjectionReport> {
        let definition = self.registry.get(fault)?;

        if let Some(record) = self.store.load_active()? {
            return Err(EngineError::FaultAlreadyActive {
                fault: record.fault_type,
                injected_at: record.created_at,
            });
        }

        let payload = self.templates.load(definition)?;

        let pending = self.store.begin(&definition.target_paths)?;
        let record = match self.store.commit(fault, &pending) {
            Ok(record) => record,
            Err(err) => {
                // on Conflict another record owns the storage area and
                // its snapshots must not be touched
                if !matches!(err, BackupError::Conflict { .. }) {
                    self.store.roll_back(pending);
                }
                return Err(err.into());
            }
        };

        let modified = match self.apply(definition, &payload) {
            Ok(modified) => modified,
            Err(err) => {
                warn!(
                    fault = %fault,
                    error = %err,
                    "writing fault content failed; reverting from the backup record"
                );
                match self.store.restore_all(&record) {
                    Ok(summary) if summary.cleaned => {}
                    Ok(_) => warn!(
                        fault = %fault,
                        "revert incomplete; record retained, run restore to finish"
                    ),
                    Err(revert_err) => warn!(
                        fault = %fault,
                        error = %revert_err,
                        "revert failed; record retained"
                    ),
                }
                return Err(err);
            }
        };

        info!(
            fault = %fault,
            files = modified.len(),
            backed_up = record.entries.len(),
            "fault injected"
        );
        Ok(InjectionReport {
            fault_type: fault,
            description: definition.description.clone(),
            expected_error: definition.expected_error.clone(),
            severity: definition.severity,
            build_fails: definition.build_fails,
            modified_paths: modified,
            backed_up: record.entries.len(),
            injected_at: record.created_at,
        })
    }

    /// Restore the tree to its pre-injection state.
    ///
    /// Idempotent: with no active record this is a no-op reporting
    /// [`RestoreOutcome::Idle`].
    ///
    /// # Errors
    /// [`EngineError::Backup`] if the record cannot be read or is
    /// corrupt. A corrupt record is never deleted; per-file restore
    /// problems are reported in the summary instead of failing the call.
    pub fn restore(&self) -> EngineResult<RestoreOutcome> {
        let Some(record) = self.store.load_active()? else {
            info!("no active fault; tree already pristine");
            return Ok(RestoreOutcome::Idle);
        };
        let summary = self.store.restore_all(&record)?;
        if summary.cleaned {
            info!(
                fault = %summary.fault_type,
                files = summary.files.len(),
                "fault restored"
            );
        } else {
            warn!(
                fault = %summary.fault_type,
                failures = summary.failure_count(),
                "restore incomplete; record retained"
            );
        }
        Ok(RestoreOutcome::Restored { summary })
    }

    /// Report whether a fault is active, from durable storage.
    ///
    /// # Errors
    /// [`EngineError::Backup`] if a record exists but is corrupt.
    pub fn status(&self) -> EngineResult<HarnessStatus> {
        let active = self.store.load_active()?.map(|record| ActiveFault {
            fault_type: record.fault_type,
            injected_at: record.created_at,
            entry_count: record.entries.len(),
        });
        Ok(HarnessStatus { active })
    }

    /// The catalog in listing form, in catalog order.
    #[must_use]
    pub fn fault_types(&self) -> Vec<FaultSummary> {
        self.registry.definitions().map(FaultSummary::from).collect()
    }

    /// Check every catalog template on disk.
    #[must_use]
    pub fn verify_templates(&self) -> VerifyReport {
        self.templates.verify(&self.registry)
    }

    fn apply(&self, definition: &FaultDefinition, payload: &[u8]) -> EngineResult<Vec<PathBuf>> {
        let mut modified = Vec::new();
        for target in definition.paths_to_overwrite() {
            let absolute = self.project_root.join(target);
            if let Some(parent) = absolute.parent() {
                fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
            fs::write(&absolute, payload).map_err(|e| EngineError::io(&absolute, e))?;
            debug!(
                path = %target.display(),
                bytes = payload.len(),
                "fault content written"
            );
            modified.push(target.clone());
        }
        Ok(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_missing_project_root() {
        let tmp = tempfile::tempdir().unwrap();
        let config = HarnessConfig::new(tmp.path().join("does-not-exist"));
        let err = Harness::open(config).unwrap_err();
        assert!(matches!(err, EngineError::ProjectRootInvalid { .. }));
    }

    #[test]
    fn open_rejects_file_as_project_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a-file");
        fs::write(&file, b"not a directory").unwrap();
        let err = Harness::open(HarnessConfig::new(&file)).unwrap_err();
        match err {
            EngineError::ProjectRootInvalid { reason, .. } => {
                assert_eq!(reason, "not a directory");
            }
            other => panic!("expected ProjectRootInvalid, got {other:?}"),
        }
    }

    #[test]
    fn with_registry_swaps_the_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let harness = Harness::open(HarnessConfig::new(tmp.path()))
            .unwrap()
            .with_registry(FaultRegistry::from_definitions([]).unwrap());
        assert!(harness.registry().is_empty());
        assert!(harness.fault_types().is_empty());
    }
}
