//! Persisted backup record
//!
//! The record (`metadata.json` inside backup storage) marks which fault is
//! currently active and what must be restored. It is the only on-disk
//! format that must stay readable across runs of the tool: a restore must
//! be able to read a record written by any earlier injection, which is why
//! the schema carries an explicit version.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use faultline_registry::FaultKind;
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;

/// Current schema version of [`BackupRecord`].
pub const RECORD_VERSION: u32 = 1;

/// What was captured for one target path before it was overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    /// The target existed; its full content lives in snapshot storage.
    File {
        /// File name inside the storage `files/` directory
        storage_key: String,
        /// Digest of the original content, checked after copy-back
        digest: ContentDigest,
    },
    /// The target did not exist; restore deletes it instead of overwriting.
    Absent,
}

impl Snapshot {
    /// Whether this entry recorded the did-not-exist marker.
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Snapshot::Absent)
    }
}

/// One target path and its captured snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Target path, relative to the project root
    pub original_path: PathBuf,
    /// What restore must do for this path
    pub snapshot: Snapshot,
}

/// The metadata record describing the in-progress fault.
///
/// At most one record exists at a time; it is created after every snapshot
/// is durable and before any target is overwritten, and deleted after all
/// entries are copied back. The [`BackupStore`](crate::BackupStore)
/// exclusively owns its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Schema version; readers reject versions they do not understand
    pub version: u32,
    /// The fault currently active
    pub fault_type: FaultKind,
    /// When the backup was taken
    pub created_at: DateTime<Utc>,
    /// One entry per target path, in definition order
    pub entries: Vec<BackupEntry>,
}

impl BackupRecord {
    /// Create a fresh record stamped with the current time.
    pub(crate) fn new(fault_type: FaultKind, entries: Vec<BackupEntry>) -> Self {
        Self {
            version: RECORD_VERSION,
            fault_type,
            created_at: Utc::now(),
            entries,
        }
    }

    /// Number of entries whose content was snapshotted.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.snapshot.is_absent())
            .count()
    }

    /// Number of entries recorded with the did-not-exist marker.
    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.entries.iter().filter(|e| e.snapshot.is_absent()).count()
    }
}
