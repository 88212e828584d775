//! Builtin fault catalog
//!
//! One definition per [`FaultKind`], targeting the layout of the demo
//! Vite/React project. Catalog order is [`FaultKind::ALL`] order.

use std::path::PathBuf;

use crate::definition::{FaultDefinition, TemplateApplication};
use crate::kind::{FaultKind, Severity};

fn targets<const N: usize>(paths: [&str; N]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

/// The builtin definitions, in catalog order.
pub(crate) fn builtin_definitions() -> Vec<FaultDefinition> {
    vec![
        FaultDefinition::new(
            FaultKind::SyntaxError,
            "build-errors/syntax-error.jsx",
            targets(["src/App.jsx"]),
        )
        .with_description("Unclosed JSX tag in the root component")
        .with_expected_error("Transform failed: Unexpected end of file")
        .with_severity(Severity::Critical),
        FaultDefinition::new(
            FaultKind::ImportError,
            "build-errors/import-error.jsx",
            targets(["src/main.jsx"]),
        )
        .with_description("Entry module imports a file that does not exist")
        .with_expected_error("Failed to resolve import \"./missing-module\"")
        .with_severity(Severity::Critical),
        FaultDefinition::new(
            FaultKind::TypescriptError,
            "build-errors/typescript-error.ts",
            targets(["src/utils/format.ts"]),
        )
        .with_description("Type mismatch in a TypeScript utility module")
        .with_expected_error("TS2322: Type 'string' is not assignable to type 'number'")
        .with_severity(Severity::High),
        FaultDefinition::new(
            FaultKind::UndefinedVariable,
            "build-errors/undefined-variable.jsx",
            targets(["src/App.jsx"]),
        )
        .with_description("References a variable that is never declared; survives the build and crashes at runtime")
        .with_expected_error("ReferenceError: metricsClient is not defined")
        .with_severity(Severity::High)
        .with_build_fails(false),
        FaultDefinition::new(
            FaultKind::DependencyMissing,
            "build-errors/dependency-missing.json",
            targets(["package.json"]),
        )
        .with_description("Removes react from the dependency manifest while the source still imports it")
        .with_expected_error("Rollup failed to resolve import \"react\"")
        .with_severity(Severity::Critical),
        FaultDefinition::new(
            FaultKind::DependencyVersionConflict,
            "build-errors/dependency-version-conflict.json",
            targets(["package.json", "package-lock.json"]),
        )
        .with_description("Pins react and react-dom to conflicting major versions; the lockfile is snapshotted because installation rewrites it")
        .with_expected_error("ERESOLVE unable to resolve dependency tree")
        .with_severity(Severity::Critical)
        .with_application(TemplateApplication::FirstTargetOnly),
        FaultDefinition::new(
            FaultKind::EnvVariableMissing,
            "build-errors/env-variable-missing.js",
            targets(["src/config/env.js"]),
        )
        .with_description("Config module requires an environment variable the pipeline does not define")
        .with_expected_error("VITE_API_BASE_URL is not defined")
        .with_severity(Severity::High)
        .with_build_fails(false),
        FaultDefinition::new(
            FaultKind::ViteConfigError,
            "build-errors/vite-config-error.js",
            targets(["vite.config.js"]),
        )
        .with_description("Bundler config references a plugin package that is not installed")
        .with_expected_error("failed to load config from vite.config.js")
        .with_severity(Severity::Critical),
        FaultDefinition::new(
            FaultKind::CssSyntaxError,
            "build-errors/css-syntax-error.css",
            targets(["src/styles/main.css"]),
        )
        .with_description("Unclosed block in the main stylesheet")
        .with_expected_error("[postcss] Unclosed block")
        .with_severity(Severity::High),
        FaultDefinition::new(
            FaultKind::CircularDependency,
            "build-errors/circular-dependency.js",
            targets(["src/utils/cycleA.js", "src/utils/cycleB.js"]),
        )
        .with_description("Creates a pair of utility modules that import each other")
        .with_expected_error("Circular dependency: src/utils/cycleA.js -> src/utils/cycleB.js")
        .with_severity(Severity::Medium)
        .with_build_fails(false),
        FaultDefinition::new(
            FaultKind::BuildOutOfMemory,
            "build-errors/build-out-of-memory.js",
            targets(["src/utils/heavy.js"]),
        )
        .with_description("Generates a module whose bundling exhausts the JavaScript heap")
        .with_expected_error("JavaScript heap out of memory")
        .with_severity(Severity::Critical),
        FaultDefinition::new(
            FaultKind::AssetSizeExceeded,
            "build-errors/asset-size-exceeded.js",
            targets(["src/assets/bigdata.js"]),
        )
        .with_description("Adds an inline asset module far above the configured chunk size limit")
        .with_expected_error("chunks are larger than the configured limit after minification")
        .with_severity(Severity::Medium)
        .with_build_fails(false),
    ]
}
