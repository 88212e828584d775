//! Fault definitions
//!
//! A [`FaultDefinition`] binds a [`FaultKind`] to the payload template that
//! realizes it and the working-tree paths it touches.

use std::path::{Path, PathBuf};

use crate::kind::{FaultKind, Severity};

/// How one template maps onto a definition's target paths.
///
/// A definition always carries exactly one template. Most faults overwrite
/// every target with it; some list extra targets only so they are
/// snapshotted and restored (a lockfile the downstream build rewrites, for
/// example) and overwrite just the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateApplication {
    /// Apply the template to every target path.
    AllTargets,
    /// Apply the template to the first target path only; remaining targets
    /// are snapshotted and restored but never overwritten by the harness.
    FirstTargetOnly,
}

/// Immutable definition of one fault type.
///
/// Target paths and the template path are relative; the engine resolves
/// them against the configured project root and template root.
#[derive(Debug, Clone)]
pub struct FaultDefinition {
    /// Which fault this definition realizes
    pub kind: FaultKind,
    /// Payload file, relative to the template root
    pub template_path: PathBuf,
    /// Ordered, non-empty paths in the working tree, relative to the
    /// project root
    pub target_paths: Vec<PathBuf>,
    /// How the template maps onto the targets
    pub application: TemplateApplication,
    /// Human-readable summary of what the fault breaks
    pub description: String,
    /// The diagnostic the downstream pipeline is expected to surface
    pub expected_error: String,
    /// Informational severity
    pub severity: Severity,
    /// Whether applying this fault is expected to make the build fail
    /// (some faults survive the build and break only at runtime)
    pub build_fails: bool,
}

impl FaultDefinition {
    /// Create a definition with the given kind, template, and targets.
    ///
    /// Metadata defaults to empty strings, [`Severity::High`], a failing
    /// build, and [`TemplateApplication::AllTargets`]; use the `with_*`
    /// builders to fill it in. Target-list validity is checked when the
    /// definition enters a [`FaultRegistry`](crate::FaultRegistry).
    #[must_use]
    pub fn new(
        kind: FaultKind,
        template_path: impl Into<PathBuf>,
        target_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            kind,
            template_path: template_path.into(),
            target_paths,
            application: TemplateApplication::AllTargets,
            description: String::new(),
            expected_error: String::new(),
            severity: Severity::High,
            build_fails: true,
        }
    }

    /// With a description.
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With the diagnostic the pipeline is expected to surface.
    #[inline]
    #[must_use]
    pub fn with_expected_error(mut self, expected_error: impl Into<String>) -> Self {
        self.expected_error = expected_error.into();
        self
    }

    /// With a severity.
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// With the build-fails flag.
    #[inline]
    #[must_use]
    pub fn with_build_fails(mut self, build_fails: bool) -> Self {
        self.build_fails = build_fails;
        self
    }

    /// With a template application mode.
    #[inline]
    #[must_use]
    pub fn with_application(mut self, application: TemplateApplication) -> Self {
        self.application = application;
        self
    }

    /// The target paths the engine must overwrite, per the application mode.
    ///
    /// Always a non-empty prefix of [`target_paths`](Self::target_paths)
    /// once the definition has passed registry validation.
    #[must_use]
    pub fn paths_to_overwrite(&self) -> &[PathBuf] {
        match self.application {
            TemplateApplication::AllTargets => &self.target_paths,
            TemplateApplication::FirstTargetOnly => {
                let end = usize::min(1, self.target_paths.len());
                &self.target_paths[..end]
            }
        }
    }

    /// The first target path, if any.
    #[inline]
    #[must_use]
    pub fn first_target(&self) -> Option<&Path> {
        self.target_paths.first().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(application: TemplateApplication) -> FaultDefinition {
        FaultDefinition::new(
            FaultKind::SyntaxError,
            "build-errors/syntax-error.jsx",
            vec![PathBuf::from("src/App.jsx"), PathBuf::from("src/main.jsx")],
        )
        .with_application(application)
    }

    #[test]
    fn builder_fills_metadata() {
        let def = definition(TemplateApplication::AllTargets)
            .with_description("unclosed tag")
            .with_expected_error("Unexpected end of file")
            .with_severity(Severity::Critical)
            .with_build_fails(false);
        assert_eq!(def.description, "unclosed tag");
        assert_eq!(def.expected_error, "Unexpected end of file");
        assert_eq!(def.severity, Severity::Critical);
        assert!(!def.build_fails);
    }

    #[test]
    fn all_targets_overwrites_everything() {
        let def = definition(TemplateApplication::AllTargets);
        assert_eq!(def.paths_to_overwrite().len(), 2);
    }

    #[test]
    fn first_target_only_overwrites_one() {
        let def = definition(TemplateApplication::FirstTargetOnly);
        let paths = def.paths_to_overwrite();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0], PathBuf::from("src/App.jsx"));
        // the second target is still part of the definition
        assert_eq!(def.target_paths.len(), 2);
    }

    #[test]
    fn paths_to_overwrite_tolerates_empty_targets() {
        // An empty definition never passes registry validation, but the
        // accessor itself must not panic on one.
        let def = FaultDefinition::new(FaultKind::SyntaxError, "t.jsx", Vec::new())
            .with_application(TemplateApplication::FirstTargetOnly);
        assert!(def.paths_to_overwrite().is_empty());
        assert!(def.first_target().is_none());
    }
}
