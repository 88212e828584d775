//! Snapshot and restore for fault injection.
//!
//! Before a fault overwrites files in a project tree, this crate captures
//! their exact bytes; afterwards it puts them back and verifies the result.
//! The persisted [`BackupRecord`] doubles as the mutual-exclusion marker:
//! while one exists, no further fault may be injected.
//!
//! # Core Concepts
//!
//! - **[`BackupStore`]**: explicit handle over a project root and a storage
//!   directory; owns snapshot files and the record lifecycle.
//! - **[`PendingBackup`]**: snapshots taken but not yet committed. Either
//!   sealed into a record by [`BackupStore::commit`] or undone by
//!   [`BackupStore::roll_back`] when the injection failed partway.
//! - **[`BackupRecord`]**: the durable receipt listing every touched path,
//!   written only after all snapshots are safe and deleted only after all
//!   content is back.
//! - **[`ContentDigest`]**: SHA-256 of file content, stamped at backup time
//!   and checked again after restore.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use faultline_backup::BackupStore;
//! use faultline_registry::FaultKind;
//!
//! let store = BackupStore::new("demo", "demo/.faultline-backup");
//! let targets = vec![PathBuf::from("src/App.jsx")];
//! let pending = store.begin(&targets)?;
//! // ... overwrite the targets with fault content ...
//! let record = store.commit(FaultKind::SyntaxError, &pending)?;
//! let summary = store.restore_all(&record)?;
//! assert!(summary.cleaned);
//! # Ok::<(), faultline_backup::BackupError>(())
//! ```

mod digest;
mod error;
mod record;
mod store;

pub use digest::{ContentDigest, DigestError};
pub use error::{BackupError, BackupResult};
pub use record::{BackupEntry, BackupRecord, Snapshot, RECORD_VERSION};
pub use store::{
    BackupStore, EntryDisposition, PendingBackup, RestoreSummary, RestoredFile, FILES_DIR,
    METADATA_FILE,
};

/// Crate version, from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
