//! Engine errors

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use faultline_backup::BackupError;
use faultline_registry::{FaultKind, RegistryError};

use crate::template::TemplateError;

/// Anything a harness operation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Catalog lookup or validation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Backup storage failed.
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// A template is missing, unreadable, or mislabeled.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A fault is already in the tree and must be restored first.
    #[error("fault '{fault}' is already active (injected {injected_at}); restore it before injecting another")]
    FaultAlreadyActive {
        /// The fault the existing record names
        fault: FaultKind,
        /// When its record was committed
        injected_at: DateTime<Utc>,
    },

    /// The configured project root does not exist or is not a directory.
    #[error("project root {path} is not a usable directory: {reason}")]
    ProjectRootInvalid {
        /// Configured project root
        path: PathBuf,
        /// Why it cannot be used
        reason: String,
    },

    /// I/O failed while writing fault content.
    #[error("io error on {path}: {source}")]
    Io {
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        EngineError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the operation was refused because a fault is active or a
    /// record already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::FaultAlreadyActive { .. }
                | EngineError::Backup(BackupError::Conflict { .. })
        )
    }

    /// Whether backup state exists but cannot be interpreted.
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, EngineError::Backup(err) if err.is_corrupt_state())
    }
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
