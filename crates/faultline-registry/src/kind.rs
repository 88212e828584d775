//! Fault-type enumeration
//!
//! Provides [`FaultKind`], the closed set of build failures the harness can
//! reproduce, together with [`FaultCategory`] and [`Severity`] metadata.
//!
//! Fault types are a fixed enumeration rather than free-form strings: an
//! identifier that survives parsing is guaranteed to name a real fault, so
//! nothing downstream needs to handle typos.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named category of build failure the harness can reproduce.
///
/// The wire form (CLI arguments, the persisted backup record, JSON reports)
/// is the kebab-case id returned by [`FaultKind::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaultKind {
    /// Unparseable source in the root component
    SyntaxError,
    /// Entry module imports a file that does not exist
    ImportError,
    /// Type error in a TypeScript utility module
    TypescriptError,
    /// Reference to a variable that is never declared
    UndefinedVariable,
    /// Imported package removed from the dependency manifest
    DependencyMissing,
    /// Conflicting version pins in the dependency manifest
    DependencyVersionConflict,
    /// Required environment variable absent from the pipeline
    EnvVariableMissing,
    /// Broken bundler configuration file
    ViteConfigError,
    /// Unparseable stylesheet
    CssSyntaxError,
    /// Utility modules importing each other
    CircularDependency,
    /// Module whose bundling exhausts the JavaScript heap
    BuildOutOfMemory,
    /// Inline asset far above the configured chunk size limit
    AssetSizeExceeded,
}

impl FaultKind {
    /// Every fault kind, in catalog order.
    ///
    /// The order is stable and matches the builtin registry, so exhaustive
    /// iteration in tests and reports is deterministic.
    pub const ALL: [FaultKind; 12] = [
        FaultKind::SyntaxError,
        FaultKind::ImportError,
        FaultKind::TypescriptError,
        FaultKind::UndefinedVariable,
        FaultKind::DependencyMissing,
        FaultKind::DependencyVersionConflict,
        FaultKind::EnvVariableMissing,
        FaultKind::ViteConfigError,
        FaultKind::CssSyntaxError,
        FaultKind::CircularDependency,
        FaultKind::BuildOutOfMemory,
        FaultKind::AssetSizeExceeded,
    ];

    /// The stable kebab-case identifier used on the CLI and on disk.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FaultKind::SyntaxError => "syntax-error",
            FaultKind::ImportError => "import-error",
            FaultKind::TypescriptError => "typescript-error",
            FaultKind::UndefinedVariable => "undefined-variable",
            FaultKind::DependencyMissing => "dependency-missing",
            FaultKind::DependencyVersionConflict => "dependency-version-conflict",
            FaultKind::EnvVariableMissing => "env-variable-missing",
            FaultKind::ViteConfigError => "vite-config-error",
            FaultKind::CssSyntaxError => "css-syntax-error",
            FaultKind::CircularDependency => "circular-dependency",
            FaultKind::BuildOutOfMemory => "build-out-of-memory",
            FaultKind::AssetSizeExceeded => "asset-size-exceeded",
        }
    }

    /// The failure category this fault belongs to.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> FaultCategory {
        match self {
            FaultKind::SyntaxError
            | FaultKind::ImportError
            | FaultKind::TypescriptError
            | FaultKind::UndefinedVariable => FaultCategory::Compile,
            FaultKind::DependencyMissing
            | FaultKind::DependencyVersionConflict
            | FaultKind::EnvVariableMissing
            | FaultKind::ViteConfigError => FaultCategory::Dependency,
            FaultKind::CssSyntaxError
            | FaultKind::CircularDependency
            | FaultKind::BuildOutOfMemory
            | FaultKind::AssetSizeExceeded => FaultCategory::Bundling,
        }
    }
}

impl Display for FaultKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultKind {
    type Err = ParseFaultKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| ParseFaultKindError {
                input: s.to_string(),
            })
    }
}

// The wire form is always the id string, so records and reports stay
// readable and the Display/serde representations cannot drift apart.
impl Serialize for FaultKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FaultKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FaultKindVisitor;

        impl serde::de::Visitor<'_> for FaultKindVisitor {
            type Value = FaultKind;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a kebab-case fault type identifier")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(FaultKindVisitor)
    }
}

/// Error returned when an identifier names no known fault type.
///
/// This is the only place a mistyped fault id can surface; everything past
/// the string boundary works with [`FaultKind`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fault type: '{input}'")]
pub struct ParseFaultKindError {
    /// The identifier that failed to parse.
    pub input: String,
}

/// Failure category, used for grouping in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultCategory {
    /// Source fails to compile or transform
    Compile,
    /// Dependency or configuration problem
    Dependency,
    /// Asset bundling problem
    Bundling,
}

impl FaultCategory {
    /// Lowercase category name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FaultCategory::Compile => "compile",
            FaultCategory::Dependency => "dependency",
            FaultCategory::Bundling => "bundling",
        }
    }
}

impl Display for FaultCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational severity of a fault. No runtime effect on correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Breaks the build or deploy outright
    Critical,
    /// Breaks the application even if the build survives
    High,
    /// Degrades the build output
    Medium,
    /// Cosmetic or advisory
    Low,
}

impl Severity {
    /// Lowercase severity name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
