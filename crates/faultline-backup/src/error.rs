//! Error types for the backup manager
//!
//! Three families map onto three caller obligations: `Io` is fatal to the
//! current call and leaves no partial backup behind, `Conflict` means an
//! earlier fault must be restored first, and `CorruptState` requires
//! manual intervention because the store refuses to guess at (or delete)
//! state it cannot interpret.

use std::path::PathBuf;

/// Errors raised by backup, commit, load, and restore operations.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Filesystem operation failed for a reason other than non-existence
    #[error("io error on {path}: {source}")]
    Io {
        /// The path the operation touched
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: std::io::Error,
    },

    /// A record already exists in durable storage
    #[error("a backup record already exists at {path}; restore the active fault first")]
    Conflict {
        /// Location of the existing record
        path: PathBuf,
    },

    /// The persisted record exists but cannot be trusted
    #[error("corrupt backup state at {path}: {reason}")]
    CorruptState {
        /// Location of the uninterpretable record
        path: PathBuf,
        /// What failed to parse or resolve
        reason: String,
    },

    /// Record could not be encoded for writing
    #[error("failed to encode backup record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl BackupError {
    /// Create an IO error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a corrupt-state error for a path.
    pub fn corrupt_state(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the persisted state needs a human.
    #[inline]
    #[must_use]
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }
}

/// Result type alias for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_display_names_the_path() {
        let err = BackupError::io(
            "src/App.jsx",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("src/App.jsx"));
        assert!(rendered.contains("denied"));
    }

    #[test]
    fn corrupt_state_predicate() {
        let err = BackupError::corrupt_state(".faultline-backup/metadata.json", "unparseable");
        assert!(err.is_corrupt_state());
        let io = BackupError::io("x", std::io::Error::other("boom"));
        assert!(!io.is_corrupt_state());
    }
}
