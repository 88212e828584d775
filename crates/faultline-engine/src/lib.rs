//! Fault injection for front-end build pipelines.
//!
//! The engine takes a known-good project tree, injects exactly one
//! catalog fault (a syntax error, a broken dependency manifest, a
//! mangled bundler config, ...), lets a build run against it, and then
//! restores the tree byte-for-byte from snapshots taken before anything
//! was touched.
//!
//! # Core Concepts
//!
//! - **[`Harness`]**: the orchestrator. Owns a catalog, a template store
//!   and a backup store over one project root.
//! - **[`HarnessConfig`]**: where the project, templates and backup
//!   storage live.
//! - **[`TemplateStore`]**: loads fault payloads and enforces their
//!   in-band markers.
//! - **Reports**: every operation returns a serializable outcome
//!   ([`InjectionReport`], [`RestoreOutcome`], [`HarnessStatus`]).
//!
//! Injection ordering is the whole point: tree confirmed idle, template
//! validated, originals snapshotted, backup record committed, and only
//! then fault content written. One fault at a time; the record is the
//! lock.
//!
//! # Example
//!
//! ```no_run
//! use faultline_engine::{FaultKind, Harness, HarnessConfig};
//!
//! let harness = Harness::open(HarnessConfig::new("demo"))?;
//! let report = harness.inject(FaultKind::SyntaxError)?;
//! println!("build should now fail with: {}", report.expected_error);
//! // ... run the pipeline under test ...
//! let outcome = harness.restore()?;
//! assert!(!outcome.is_idle());
//! # Ok::<(), faultline_engine::EngineError>(())
//! ```

mod config;
mod error;
mod harness;
mod report;
mod template;

pub use config::{HarnessConfig, DEFAULT_BACKUP_DIR, DEFAULT_TEMPLATES_ROOT};
pub use error::{EngineError, EngineResult};
pub use harness::Harness;
pub use report::{ActiveFault, FaultSummary, HarnessStatus, InjectionReport, RestoreOutcome};
pub use template::{TemplateError, TemplateIssue, TemplateStore, VerifyReport};

pub use faultline_registry::FaultKind;

/// Crate version, from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
