//! Fault registry
//!
//! Provides [`FaultRegistry`], the insertion-ordered catalog mapping each
//! [`FaultKind`] to its [`FaultDefinition`]. Loaded once per process; every
//! lookup afterwards is a pure function of the catalog.

use indexmap::IndexMap;

use crate::catalog::builtin_definitions;
use crate::definition::FaultDefinition;
use crate::error::{RegistryError, RegistryResult};
use crate::kind::FaultKind;

/// Insertion-ordered catalog of fault definitions.
///
/// The registry is an explicit instance with no hidden global state: the
/// harness constructs one at startup and tests construct independent,
/// possibly partial, catalogs per case via [`from_definitions`].
///
/// [`from_definitions`]: FaultRegistry::from_definitions
#[derive(Debug, Clone)]
pub struct FaultRegistry {
    definitions: IndexMap<FaultKind, FaultDefinition>,
}

impl FaultRegistry {
    /// The builtin twelve-fault catalog, in [`FaultKind::ALL`] order.
    ///
    /// Structural validity (unique kinds, non-empty target lists) is fixed
    /// at compile time for the builtin catalog; template existence is
    /// checked by the engine before a fault is applied.
    #[must_use]
    pub fn builtin() -> Self {
        let mut definitions = IndexMap::with_capacity(FaultKind::ALL.len());
        for def in builtin_definitions() {
            definitions.insert(def.kind, def);
        }
        Self { definitions }
    }

    /// Build a registry from explicit definitions, preserving their order.
    ///
    /// # Errors
    /// Returns [`RegistryError::Duplicate`] if two definitions share a kind
    /// and [`RegistryError::EmptyTargets`] if a definition lists no target
    /// paths. Validation fails fast: the first offending definition wins.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = FaultDefinition>,
    ) -> RegistryResult<Self> {
        let mut map = IndexMap::new();
        for def in definitions {
            if def.target_paths.is_empty() {
                return Err(RegistryError::EmptyTargets { kind: def.kind });
            }
            let kind = def.kind;
            if map.insert(kind, def).is_some() {
                return Err(RegistryError::Duplicate { kind });
            }
        }
        Ok(Self { definitions: map })
    }

    /// Look up the definition for a kind.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotRegistered`] if this catalog does not
    /// carry the kind (only partial catalogs built by tests can miss one).
    pub fn get(&self, kind: FaultKind) -> RegistryResult<&FaultDefinition> {
        self.definitions
            .get(&kind)
            .ok_or(RegistryError::NotRegistered { kind })
    }

    /// Whether this catalog carries a kind.
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: FaultKind) -> bool {
        self.definitions.contains_key(&kind)
    }

    /// Iterate definitions in insertion order.
    pub fn definitions(&self) -> impl Iterator<Item = &FaultDefinition> {
        self.definitions.values()
    }

    /// Iterate registered kinds in insertion order.
    pub fn kinds(&self) -> impl Iterator<Item = FaultKind> + '_ {
        self.definitions.keys().copied()
    }

    /// Number of registered definitions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn minimal(kind: FaultKind, target: &str) -> FaultDefinition {
        FaultDefinition::new(kind, "t.tpl", vec![PathBuf::from(target)])
    }

    #[test]
    fn builtin_covers_every_kind() {
        let registry = FaultRegistry::builtin();
        assert_eq!(registry.len(), FaultKind::ALL.len());
        for kind in FaultKind::ALL {
            assert!(registry.contains(kind));
            assert_eq!(registry.get(kind).unwrap().kind, kind);
        }
    }

    #[test]
    fn builtin_iterates_in_catalog_order() {
        let registry = FaultRegistry::builtin();
        let kinds: Vec<FaultKind> = registry.kinds().collect();
        assert_eq!(kinds, FaultKind::ALL.to_vec());
    }

    #[test]
    fn partial_registry_reports_not_registered() {
        let registry =
            FaultRegistry::from_definitions([minimal(FaultKind::SyntaxError, "src/app.js")])
                .unwrap();
        assert!(registry.contains(FaultKind::SyntaxError));
        let err = registry.get(FaultKind::CssSyntaxError).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NotRegistered {
                kind: FaultKind::CssSyntaxError
            }
        ));
    }

    #[test]
    fn duplicate_kind_is_rejected() {
        let result = FaultRegistry::from_definitions([
            minimal(FaultKind::ImportError, "src/a.js"),
            minimal(FaultKind::ImportError, "src/b.js"),
        ]);
        assert!(matches!(
            result,
            Err(RegistryError::Duplicate {
                kind: FaultKind::ImportError
            })
        ));
    }

    #[test]
    fn empty_target_list_is_rejected() {
        let result = FaultRegistry::from_definitions([FaultDefinition::new(
            FaultKind::SyntaxError,
            "t.tpl",
            Vec::new(),
        )]);
        assert!(matches!(
            result,
            Err(RegistryError::EmptyTargets {
                kind: FaultKind::SyntaxError
            })
        ));
    }

    #[test]
    fn explicit_order_is_preserved() {
        let registry = FaultRegistry::from_definitions([
            minimal(FaultKind::CssSyntaxError, "a.css"),
            minimal(FaultKind::SyntaxError, "b.jsx"),
        ])
        .unwrap();
        let kinds: Vec<FaultKind> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec![FaultKind::CssSyntaxError, FaultKind::SyntaxError]
        );
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = FaultRegistry::from_definitions([]).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
