//! Faultline fault catalog
//!
//! The closed set of build failures the harness can reproduce, and the
//! registry that binds each one to its payload template and target paths.
//!
//! # Core Concepts
//!
//! - [`FaultKind`]: closed enumeration of fault types; the wire form is the
//!   kebab-case id (`syntax-error`, `css-syntax-error`, ...)
//! - [`FaultDefinition`]: template, targets, and metadata for one kind
//! - [`FaultRegistry`]: insertion-ordered catalog, builtin or explicit
//! - [`TemplateApplication`]: whether one template overwrites every target
//!   or only the first
//!
//! # Example
//!
//! ```rust
//! use faultline_registry::{FaultKind, FaultRegistry};
//!
//! let registry = FaultRegistry::builtin();
//! let def = registry.get(FaultKind::SyntaxError)?;
//! assert_eq!(def.kind.to_string(), "syntax-error");
//! # Ok::<(), faultline_registry::RegistryError>(())
//! ```

mod catalog;
mod definition;
mod error;
mod kind;
mod registry;

pub use definition::{FaultDefinition, TemplateApplication};
pub use error::{RegistryError, RegistryResult};
pub use kind::{FaultCategory, FaultKind, ParseFaultKindError, Severity};
pub use registry::FaultRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
