//! Fault template loading and verification
//!
//! Templates are plain files on disk, one per fault. Every template must
//! carry a marker naming its fault: a `@fault-type: <id>` comment for
//! source-shaped payloads, or a top-level `"__chaos_fault__": "<id>"` key
//! for JSON payloads. The marker catches swapped or stale template files
//! before their content ever reaches a project tree, and makes injected
//! files self-describing when someone finds one in a working tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use faultline_registry::{FaultDefinition, FaultKind, FaultRegistry};

/// A template problem found while loading or verifying.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template file does not exist.
    #[error("no template for fault '{kind}' at {path}")]
    Missing {
        /// Fault the template belongs to
        kind: FaultKind,
        /// Expected template location
        path: PathBuf,
    },
    /// The template file exists but cannot be read.
    #[error("template for fault '{kind}' at {path} is unreadable: {source}")]
    Unreadable {
        /// Fault the template belongs to
        kind: FaultKind,
        /// Template location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
    /// The template content does not carry the marker for its fault.
    #[error("template at {path} does not carry the marker for fault '{kind}'")]
    MarkerMissing {
        /// Fault the template claims to belong to
        kind: FaultKind,
        /// Template location
        path: PathBuf,
    },
}

/// One problem found by [`TemplateStore::verify`].
#[derive(Debug, Clone, Serialize)]
pub struct TemplateIssue {
    /// Fault whose template is unusable
    pub fault_type: FaultKind,
    /// What is wrong with it
    pub problem: String,
}

/// Outcome of verifying a registry's templates.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Number of definitions checked
    pub checked: usize,
    /// Problems found, in catalog order
    pub issues: Vec<TemplateIssue>,
}

impl VerifyReport {
    /// Whether every checked template loaded and carried its marker.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Read-only access to the fault template directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    /// A store rooted at a template directory. Nothing is read until
    /// [`load`](Self::load) or [`verify`](Self::verify) runs.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The template directory.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a definition's template and check its marker.
    ///
    /// # Errors
    /// [`TemplateError::Missing`] or [`TemplateError::Unreadable`] if the
    /// file cannot be read, [`TemplateError::MarkerMissing`] if its
    /// content does not name the definition's fault.
    pub fn load(&self, definition: &FaultDefinition) -> Result<Vec<u8>, TemplateError> {
        let path = self.root.join(&definition.template_path);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TemplateError::Missing {
                    kind: definition.kind,
                    path,
                })
            }
            Err(e) => {
                return Err(TemplateError::Unreadable {
                    kind: definition.kind,
                    path,
                    source: e,
                })
            }
        };
        if !has_marker(&bytes, definition.kind) {
            return Err(TemplateError::MarkerMissing {
                kind: definition.kind,
                path,
            });
        }
        debug!(
            fault = %definition.kind,
            path = %path.display(),
            bytes = bytes.len(),
            "template loaded"
        );
        Ok(bytes)
    }

    /// Check every definition's template in catalog order.
    #[must_use]
    pub fn verify(&self, registry: &FaultRegistry) -> VerifyReport {
        let mut checked = 0;
        let mut issues = Vec::new();
        for definition in registry.definitions() {
            checked += 1;
            if let Err(err) = self.load(definition) {
                issues.push(TemplateIssue {
                    fault_type: definition.kind,
                    problem: err.to_string(),
                });
            }
        }
        VerifyReport { checked, issues }
    }
}

/// Whether template content names the given fault.
///
/// The comment form is a literal substring match; the JSON form parses
/// the document so key spacing and ordering do not matter.
fn has_marker(bytes: &[u8], kind: FaultKind) -> bool {
    let text = String::from_utf8_lossy(bytes);
    if text.contains(&format!("@fault-type: {kind}")) {
        return true;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&text) {
        return map.get("__chaos_fault__").and_then(serde_json::Value::as_str)
            == Some(kind.as_str());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn definition(kind: FaultKind, template: &str) -> FaultDefinition {
        FaultDefinition::new(kind, template, vec![PathBuf::from("src/app.js")])
    }

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TemplateStore) {
        let tmp = tempfile::tempdir().expect("tempdir");
        for (rel, content) in files {
            let path = tmp.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let store = TemplateStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn load_returns_marked_template_bytes() {
        let body = "// @fault-type: syntax-error\nexport default {;\n";
        let (_tmp, store) = store_with(&[("build-errors/syntax-error.jsx", body)]);
        let def = definition(FaultKind::SyntaxError, "build-errors/syntax-error.jsx");
        assert_eq!(store.load(&def).unwrap(), body.as_bytes());
    }

    #[test]
    fn missing_template_is_reported_with_its_path() {
        let (_tmp, store) = store_with(&[]);
        let def = definition(FaultKind::SyntaxError, "build-errors/syntax-error.jsx");
        let err = store.load(&def).unwrap_err();
        match err {
            TemplateError::Missing { kind, path } => {
                assert_eq!(kind, FaultKind::SyntaxError);
                assert!(path.ends_with("build-errors/syntax-error.jsx"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn unmarked_template_is_rejected() {
        let (_tmp, store) = store_with(&[("t.jsx", "export default {;\n")]);
        let def = definition(FaultKind::SyntaxError, "t.jsx");
        assert!(matches!(
            store.load(&def),
            Err(TemplateError::MarkerMissing { .. })
        ));
    }

    #[test]
    fn marker_for_a_different_fault_is_rejected() {
        let (_tmp, store) = store_with(&[("t.jsx", "// @fault-type: import-error\nboom\n")]);
        let def = definition(FaultKind::SyntaxError, "t.jsx");
        assert!(matches!(
            store.load(&def),
            Err(TemplateError::MarkerMissing { .. })
        ));
    }

    #[test]
    fn json_marker_survives_formatting_differences() {
        let body = "{\n  \"name\": \"demo\",\n  \"__chaos_fault__\"   :   \"dependency-missing\"\n}\n";
        let (_tmp, store) = store_with(&[("t.json", body)]);
        let def = definition(FaultKind::DependencyMissing, "t.json");
        assert!(store.load(&def).is_ok());
    }

    #[test]
    fn json_marker_with_wrong_value_is_rejected() {
        let body = "{ \"__chaos_fault__\": \"import-error\" }";
        let (_tmp, store) = store_with(&[("t.json", body)]);
        let def = definition(FaultKind::DependencyMissing, "t.json");
        assert!(matches!(
            store.load(&def),
            Err(TemplateError::MarkerMissing { .. })
        ));
    }

    #[test]
    fn verify_collects_every_problem() {
        let (_tmp, store) = store_with(&[
            ("ok.jsx", "// @fault-type: syntax-error\nboom\n"),
            ("unmarked.jsx", "clean content\n"),
        ]);
        let registry = FaultRegistry::from_definitions([
            definition(FaultKind::SyntaxError, "ok.jsx"),
            definition(FaultKind::ImportError, "unmarked.jsx"),
            definition(FaultKind::CssSyntaxError, "gone.css"),
        ])
        .unwrap();

        let report = store.verify(&registry);
        assert_eq!(report.checked, 3);
        assert_eq!(report.issues.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.issues[0].fault_type, FaultKind::ImportError);
        assert_eq!(report.issues[1].fault_type, FaultKind::CssSyntaxError);
        assert!(report.issues[1].problem.contains("no template"));
    }
}
