//! Error types for the fault catalog
//!
//! Catalog errors are configuration-integrity failures: the caller has a
//! bad catalog or asked for a fault the catalog does not carry. None of
//! them are retryable and none leave partial effects.

use crate::kind::FaultKind;

/// Errors raised by catalog construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Lookup for a kind that the catalog does not contain
    #[error("fault type '{kind}' is not registered in this catalog")]
    NotRegistered {
        /// The kind that was requested
        kind: FaultKind,
    },

    /// Two definitions share one kind
    #[error("duplicate definition for fault type '{kind}'")]
    Duplicate {
        /// The kind defined twice
        kind: FaultKind,
    },

    /// A definition lists no target paths
    #[error("fault type '{kind}' defines no target paths")]
    EmptyTargets {
        /// The kind with the empty target list
        kind: FaultKind,
    },
}

/// Result type alias for catalog operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_registered_display() {
        let err = RegistryError::NotRegistered {
            kind: FaultKind::CssSyntaxError,
        };
        assert_eq!(
            err.to_string(),
            "fault type 'css-syntax-error' is not registered in this catalog"
        );
    }

    #[test]
    fn empty_targets_display() {
        let err = RegistryError::EmptyTargets {
            kind: FaultKind::ImportError,
        };
        assert_eq!(
            err.to_string(),
            "fault type 'import-error' defines no target paths"
        );
    }
}
