//! Test fixtures shared across the faultline workspace.
//!
//! [`TreeFixture`] materializes a miniature Vite/React project plus a
//! template directory covering every builtin fault, inside a temp dir
//! that is cleaned up on drop. Tests that need a real tree to injure
//! and heal start here.

#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use faultline_registry::FaultKind;

/// Directory name the backup store uses inside the fixture project.
pub const BACKUP_DIR_NAME: &str = ".faultline-backup";

const PACKAGE_JSON: &str = r#"{
  "name": "faultline-demo",
  "private": true,
  "version": "0.1.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "tsc -b && vite build",
    "preview": "vite preview"
  },
  "dependencies": {
    "react": "^18.3.1",
    "react-dom": "^18.3.1"
  },
  "devDependencies": {
    "@vitejs/plugin-react": "^4.3.4",
    "typescript": "^5.6.2",
    "vite": "^6.0.1"
  }
}
"#;

const PACKAGE_LOCK_JSON: &str = r#"{
  "name": "faultline-demo",
  "version": "0.1.0",
  "lockfileVersion": 3,
  "requires": true,
  "packages": {
    "": {
      "name": "faultline-demo",
      "version": "0.1.0",
      "dependencies": {
        "react": "^18.3.1",
        "react-dom": "^18.3.1"
      }
    }
  }
}
"#;

const VITE_CONFIG: &str = r"import { defineConfig } from 'vite';
import react from '@vitejs/plugin-react';

export default defineConfig({
  plugins: [react()],
});
";

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>faultline demo</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.jsx"></script>
  </body>
</html>
"#;

const MAIN_JSX: &str = r"import React from 'react';
import { createRoot } from 'react-dom/client';
import App from './App.jsx';
import './styles/main.css';

createRoot(document.getElementById('root')).render(<App />);
";

const APP_JSX: &str = r"import React from 'react';
import { formatCount } from './utils/format.ts';
import { apiBaseUrl } from './config/env.js';

export default function App() {
  return (
    <main>
      <h1>faultline demo</h1>
      <p>{formatCount(3)} requests to {apiBaseUrl}</p>
    </main>
  );
}
";

const ENV_JS: &str = r"export const apiBaseUrl =
  import.meta.env.VITE_API_BASE_URL ?? 'http://localhost:3000';
";

const MAIN_CSS: &str = r"main {
  font-family: sans-serif;
  margin: 2rem auto;
  max-width: 40rem;
}
";

const FORMAT_TS: &str = r"export function formatCount(value: number): string {
  return `${value} item${value === 1 ? '' : 's'}`;
}
";

/// Files the pristine fixture project contains, relative to its root.
pub const PROJECT_FILES: [(&str, &str); 9] = [
    ("package.json", PACKAGE_JSON),
    ("package-lock.json", PACKAGE_LOCK_JSON),
    ("vite.config.js", VITE_CONFIG),
    ("index.html", INDEX_HTML),
    ("src/main.jsx", MAIN_JSX),
    ("src/App.jsx", APP_JSX),
    ("src/config/env.js", ENV_JS),
    ("src/styles/main.css", MAIN_CSS),
    ("src/utils/format.ts", FORMAT_TS),
];

/// Template body the fixture writes for a fault kind.
///
/// Each body carries the marker the engine's template verification looks
/// for, plus a payload shaped like the real thing but trimmed down.
#[must_use]
pub fn template_body(kind: FaultKind) -> &'static str {
    match kind {
        FaultKind::SyntaxError => {
            "// @fault-type: syntax-error\nexport default function App() {\n  return (\n    <main>\n      <h1>boom\n  );\n}\n"
        }
        FaultKind::ImportError => {
            "// @fault-type: import-error\nimport { helper } from './missing-module';\n\nhelper();\n"
        }
        FaultKind::TypescriptError => {
            "// @fault-type: typescript-error\nexport function formatCount(value: number): number {\n  const result: number = 'not a number';\n  return result;\n}\n"
        }
        FaultKind::UndefinedVariable => {
            "// @fault-type: undefined-variable\nexport default function App() {\n  metricsClient.track('render');\n  return null;\n}\n"
        }
        FaultKind::DependencyMissing => {
            "{\n  \"__chaos_fault__\": \"dependency-missing\",\n  \"name\": \"faultline-demo\",\n  \"dependencies\": {\n    \"react-dom\": \"^18.3.1\"\n  }\n}\n"
        }
        FaultKind::DependencyVersionConflict => {
            "{\n  \"__chaos_fault__\": \"dependency-version-conflict\",\n  \"name\": \"faultline-demo\",\n  \"dependencies\": {\n    \"react\": \"^17.0.0\",\n    \"react-dom\": \"^18.3.1\"\n  }\n}\n"
        }
        FaultKind::EnvVariableMissing => {
            "// @fault-type: env-variable-missing\nif (!import.meta.env.VITE_API_BASE_URL) {\n  throw new Error('VITE_API_BASE_URL is not defined');\n}\nexport const apiBaseUrl = import.meta.env.VITE_API_BASE_URL;\n"
        }
        FaultKind::ViteConfigError => {
            "// @fault-type: vite-config-error\nimport { defineConfig } from 'vite';\nimport missingPlugin from 'vite-plugin-does-not-exist';\n\nexport default defineConfig({ plugins: [missingPlugin()] });\n"
        }
        FaultKind::CssSyntaxError => {
            "/* @fault-type: css-syntax-error */\nmain {\n  color: red;\n"
        }
        FaultKind::CircularDependency => {
            "// @fault-type: circular-dependency\nimport { other } from './cycleB.js';\nexport const value = () => other();\n"
        }
        FaultKind::BuildOutOfMemory => {
            "// @fault-type: build-out-of-memory\nexport const payload = new Array(1 << 28).fill('x'.repeat(1024));\n"
        }
        FaultKind::AssetSizeExceeded => {
            "// @fault-type: asset-size-exceeded\nexport const blob = 'A'.repeat(4 * 1024 * 1024);\n"
        }
    }
}

/// A disposable project tree plus fault templates.
#[derive(Debug)]
pub struct TreeFixture {
    root: TempDir,
}

impl TreeFixture {
    /// Build a pristine project and a full template directory.
    #[must_use]
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create fixture tempdir");

        let project = root.path().join("project");
        for (rel, content) in PROJECT_FILES {
            write_file(&project.join(rel), content);
        }

        let templates = root.path().join("templates");
        let registry = faultline_registry::FaultRegistry::builtin();
        for kind in FaultKind::ALL {
            let def = registry.get(kind).expect("builtin definition");
            write_file(&templates.join(&def.template_path), template_body(kind));
        }

        Self { root }
    }

    /// Root of the demo project.
    #[must_use]
    pub fn project_root(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// Root of the template directory.
    #[must_use]
    pub fn templates_root(&self) -> PathBuf {
        self.root.path().join("templates")
    }

    /// Where the backup store keeps its state for this project.
    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        self.project_root().join(BACKUP_DIR_NAME)
    }

    /// Read a project file as UTF-8, panicking if it is missing.
    #[must_use]
    pub fn read_project_file(&self, rel: &str) -> String {
        let path = self.project_root().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
    }

    /// Overwrite (or create) a project file.
    pub fn write_project_file(&self, rel: &str, content: &str) {
        write_file(&self.project_root().join(rel), content);
    }

    /// Whether a project file exists.
    #[must_use]
    pub fn project_file_exists(&self, rel: &str) -> bool {
        self.project_root().join(rel).is_file()
    }

    /// Every file in the project tree with its content, backup storage
    /// excluded. Two snapshots compare equal iff the trees are
    /// byte-identical.
    #[must_use]
    pub fn snapshot_tree(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut out = BTreeMap::new();
        collect_files(&self.project_root(), Path::new(""), &mut out);
        out
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dirs");
    }
    fs::write(path, content).expect("write fixture file");
}

fn collect_files(root: &Path, rel: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let dir = root.join(rel);
    for entry in fs::read_dir(&dir).expect("read fixture dir") {
        let entry = entry.expect("fixture dir entry");
        let name = entry.file_name();
        if rel.as_os_str().is_empty() && name == BACKUP_DIR_NAME {
            continue;
        }
        let child = rel.join(&name);
        let file_type = entry.file_type().expect("fixture file type");
        if file_type.is_dir() {
            collect_files(root, &child, out);
        } else {
            out.insert(child, fs::read(entry.path()).expect("read fixture file"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_contains_every_catalog_target_or_its_parent() {
        let fixture = TreeFixture::new();
        let registry = faultline_registry::FaultRegistry::builtin();
        for def in registry.definitions() {
            let template = fixture.templates_root().join(&def.template_path);
            assert!(template.is_file(), "{} template missing", def.kind);
        }
        // faults that overwrite existing files find them in place
        assert!(fixture.project_file_exists("src/App.jsx"));
        assert!(fixture.project_file_exists("package.json"));
        assert!(fixture.project_file_exists("vite.config.js"));
    }

    #[test]
    fn template_bodies_carry_their_marker() {
        for kind in FaultKind::ALL {
            let body = template_body(kind);
            let marked = body.contains(&format!("@fault-type: {kind}"))
                || body.contains(&format!("\"__chaos_fault__\": \"{kind}\""));
            assert!(marked, "{kind} template lacks a marker");
        }
    }

    #[test]
    fn snapshot_tree_detects_any_change() {
        let fixture = TreeFixture::new();
        let before = fixture.snapshot_tree();
        assert_eq!(before.len(), PROJECT_FILES.len());

        fixture.write_project_file("src/App.jsx", "changed");
        assert_ne!(before, fixture.snapshot_tree());
    }
}
