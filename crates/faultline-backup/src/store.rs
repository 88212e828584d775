//! Backup store
//!
//! [`BackupStore`] owns the on-disk backup area: snapshot files under
//! `files/` and the `metadata.json` record beside them. It is an explicit
//! instance constructed with its roots; there is no process-global state,
//! so tests build an independent store per case.
//!
//! Ordering invariants:
//! - every snapshot is durable before any target is overwritten,
//! - the record is written only after every snapshot (commit),
//! - the record is deleted only after every entry is copied back.
//!
//! A crash at any point therefore leaves either a pristine tree with no
//! record, or a record that says exactly what restore must replay.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use faultline_registry::FaultKind;

use crate::digest::ContentDigest;
use crate::error::{BackupError, BackupResult};
use crate::record::{BackupEntry, BackupRecord, Snapshot, RECORD_VERSION};

/// File name of the persisted record inside the storage root.
pub const METADATA_FILE: &str = "metadata.json";

/// Directory name for snapshot content inside the storage root.
pub const FILES_DIR: &str = "files";

/// Snapshots taken by [`BackupStore::begin`] but not yet committed.
///
/// Sealed into a record by [`commit`](BackupStore::commit), which borrows
/// it, or consumed by [`roll_back`](BackupStore::roll_back) if the
/// injection failed before a record existed.
#[derive(Debug)]
pub struct PendingBackup {
    entries: Vec<BackupEntry>,
}

impl PendingBackup {
    /// The entries captured so far, in target order.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[BackupEntry] {
        &self.entries
    }

    /// Number of captured entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was captured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<BackupEntry> {
        self.entries
    }
}

/// Final state of one record entry after a restore pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EntryDisposition {
    /// Snapshot content copied back and digest-verified.
    Restored {
        /// Bytes written back
        bytes: u64,
    },
    /// Created-by-injection file deleted (or already gone).
    Removed,
    /// Content copied back but the post-copy digest did not match.
    DigestMismatch {
        /// Digest recorded at backup time
        expected: ContentDigest,
        /// Digest of the content actually on disk after copy-back
        actual: ContentDigest,
    },
    /// The entry could not be physically restored.
    Failed {
        /// Human-readable cause
        reason: String,
    },
}

impl EntryDisposition {
    /// Whether the entry could not be physically restored.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, EntryDisposition::Failed { .. })
    }

    /// Whether the entry was restored and verified clean.
    #[inline]
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            EntryDisposition::Restored { .. } | EntryDisposition::Removed
        )
    }
}

/// Per-file outcome of a restore pass.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RestoredFile {
    /// Target path, relative to the project root
    pub path: PathBuf,
    /// What happened to it
    pub disposition: EntryDisposition,
}

/// Aggregated outcome of [`BackupStore::restore_all`].
///
/// Restore is best-effort per file: one bad entry never blocks the rest.
/// `cleaned` says whether the record and snapshot storage were removed,
/// which happens only when no entry hard-failed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RestoreSummary {
    /// The fault the record was committed for
    pub fault_type: FaultKind,
    /// Per-file outcomes, in record order
    pub files: Vec<RestoredFile>,
    /// Whether every entry was restored and digest-verified
    pub verified: bool,
    /// Whether the record and snapshot storage were deleted
    pub cleaned: bool,
}

impl RestoreSummary {
    /// Paths that were physically put back (restored or removed).
    #[must_use]
    pub fn restored_paths(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| !f.disposition.is_failure())
            .map(|f| f.path.as_path())
            .collect()
    }

    /// Number of entries that could not be restored.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.disposition.is_failure())
            .count()
    }

    /// Number of entries whose post-copy digest did not match.
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.disposition, EntryDisposition::DigestMismatch { .. }))
            .count()
    }
}

/// The backup manager: snapshot storage plus the record lifecycle.
#[derive(Debug, Clone)]
pub struct BackupStore {
    project_root: PathBuf,
    storage_root: PathBuf,
}

impl BackupStore {
    /// Create a store for a project tree and a storage directory.
    ///
    /// Nothing is touched on disk until [`begin`](Self::begin) runs.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            storage_root: storage_root.into(),
        }
    }

    /// Location of the persisted record.
    #[inline]
    #[must_use]
    pub fn record_path(&self) -> PathBuf {
        self.storage_root.join(METADATA_FILE)
    }

    /// Whether a record currently exists in durable storage.
    ///
    /// Existence only; a corrupt record still counts as active. Use
    /// [`load_active`](Self::load_active) to interpret it.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.record_path().is_file()
    }

    fn files_dir(&self) -> PathBuf {
        self.storage_root.join(FILES_DIR)
    }

    /// Snapshot every target path into backup storage.
    ///
    /// Existing targets are copied in full and digest-stamped; targets
    /// that do not exist are recorded with the did-not-exist marker so
    /// restore deletes them. All-or-nothing: on failure every snapshot
    /// file this call created is removed before the error returns.
    ///
    /// # Errors
    /// [`BackupError::Io`] if a target is unreadable for any reason other
    /// than non-existence, or if snapshot storage cannot be written.
    pub fn begin(&self, targets: &[PathBuf]) -> BackupResult<PendingBackup> {
        let files_dir = self.files_dir();
        fs::create_dir_all(&files_dir).map_err(|e| BackupError::io(&files_dir, e))?;

        let mut entries = Vec::with_capacity(targets.len());
        let mut written: Vec<PathBuf> = Vec::new();
        for target in targets {
            let absolute = self.project_root.join(target);
            match read_if_present(&absolute) {
                Ok(Some(bytes)) => {
                    let digest = ContentDigest::compute(&bytes);
                    let key = storage_key(target, &digest);
                    let storage = files_dir.join(&key);
                    if let Err(err) = atomic_write(&storage, &bytes) {
                        self.discard_snapshots(&written);
                        return Err(err);
                    }
                    debug!(
                        path = %target.display(),
                        key = %key,
                        bytes = bytes.len(),
                        "snapshot written"
                    );
                    written.push(storage);
                    entries.push(BackupEntry {
                        original_path: target.clone(),
                        snapshot: Snapshot::File {
                            storage_key: key,
                            digest,
                        },
                    });
                }
                Ok(None) => {
                    debug!(path = %target.display(), "target absent, marker recorded");
                    entries.push(BackupEntry {
                        original_path: target.clone(),
                        snapshot: Snapshot::Absent,
                    });
                }
                Err(err) => {
                    self.discard_snapshots(&written);
                    return Err(BackupError::io(absolute, err));
                }
            }
        }

        info!(
            snapshots = written.len(),
            absent = entries.len() - written.len(),
            "backup taken"
        );
        Ok(PendingBackup { entries })
    }

    /// Persist the record for a pending backup.
    ///
    /// Re-checks durable storage immediately before writing: a record that
    /// appeared since the caller's pre-flight check means a concurrent or
    /// stale injection, and overwriting it would strand the files it
    /// protects. The pending backup is borrowed so the caller can still
    /// [`roll_back`](Self::roll_back) if this fails.
    ///
    /// # Errors
    /// [`BackupError::Conflict`] if a record already exists;
    /// [`BackupError::Io`] if the record cannot be written.
    pub fn commit(&self, fault: FaultKind, pending: &PendingBackup) -> BackupResult<BackupRecord> {
        let record_path = self.record_path();
        if record_path.exists() {
            return Err(BackupError::Conflict { path: record_path });
        }
        let record = BackupRecord::new(fault, pending.entries().to_vec());
        let body = serde_json::to_string_pretty(&record)?;
        atomic_write(&record_path, body.as_bytes())?;
        info!(
            fault = %fault,
            entries = record.entries.len(),
            path = %record_path.display(),
            "backup record committed"
        );
        Ok(record)
    }

    /// Read the persisted record, if any.
    ///
    /// # Errors
    /// [`BackupError::CorruptState`] if the record exists but cannot be
    /// parsed, has an unsupported version, or references snapshot storage
    /// that is missing or malformed. [`BackupError::Io`] for unreadable
    /// record files.
    pub fn load_active(&self) -> BackupResult<Option<BackupRecord>> {
        let record_path = self.record_path();
        let raw = match fs::read_to_string(&record_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackupError::io(record_path, e)),
        };
        let record: BackupRecord = serde_json::from_str(&raw)
            .map_err(|e| BackupError::corrupt_state(&record_path, format!("unparseable record: {e}")))?;
        if record.version != RECORD_VERSION {
            return Err(BackupError::corrupt_state(
                &record_path,
                format!("unsupported record version {}", record.version),
            ));
        }
        for entry in &record.entries {
            if entry.original_path.is_absolute() {
                return Err(BackupError::corrupt_state(
                    &record_path,
                    format!(
                        "entry path is not relative: {}",
                        entry.original_path.display()
                    ),
                ));
            }
            if let Snapshot::File { storage_key, .. } = &entry.snapshot {
                if !valid_storage_key(storage_key) {
                    return Err(BackupError::corrupt_state(
                        &record_path,
                        format!("malformed storage key '{storage_key}'"),
                    ));
                }
                let storage = self.files_dir().join(storage_key);
                if !storage.is_file() {
                    return Err(BackupError::corrupt_state(
                        &record_path,
                        format!(
                            "missing snapshot '{storage_key}' for {}",
                            entry.original_path.display()
                        ),
                    ));
                }
            }
        }
        Ok(Some(record))
    }

    /// Replay a record onto the working tree.
    ///
    /// Best-effort per entry: snapshotted content is written back via
    /// temp-then-rename and digest-verified; marker entries delete the
    /// created file. Empty directories left behind by deletions are the
    /// caller's business. Storage and the record are removed only if no
    /// entry hard-failed; digest mismatches alone do not keep the record
    /// alive, since that would block all future injections.
    ///
    /// # Errors
    /// [`BackupError::Io`] if cleanup cannot remove the record itself.
    /// Per-entry failures are reported in the summary, not as errors.
    pub fn restore_all(&self, record: &BackupRecord) -> BackupResult<RestoreSummary> {
        let mut files = Vec::with_capacity(record.entries.len());
        for entry in &record.entries {
            let absolute = self.project_root.join(&entry.original_path);
            let disposition = match &entry.snapshot {
                Snapshot::File {
                    storage_key,
                    digest,
                } => self.restore_file(&absolute, storage_key, digest),
                Snapshot::Absent => remove_created(&absolute),
            };
            match &disposition {
                EntryDisposition::Restored { bytes } => {
                    debug!(path = %entry.original_path.display(), bytes, "content restored");
                }
                EntryDisposition::Removed => {
                    debug!(path = %entry.original_path.display(), "created file removed");
                }
                EntryDisposition::DigestMismatch { expected, actual } => {
                    warn!(
                        path = %entry.original_path.display(),
                        expected = %expected,
                        actual = %actual,
                        "restored content failed digest verification"
                    );
                }
                EntryDisposition::Failed { reason } => {
                    warn!(path = %entry.original_path.display(), reason, "entry not restored");
                }
            }
            files.push(RestoredFile {
                path: entry.original_path.clone(),
                disposition,
            });
        }

        let cleaned = if files.iter().any(|f| f.disposition.is_failure()) {
            warn!(
                fault = %record.fault_type,
                failures = files.iter().filter(|f| f.disposition.is_failure()).count(),
                "restore incomplete; record retained for retry"
            );
            false
        } else {
            self.clear_storage()?;
            info!(fault = %record.fault_type, "backup record and storage cleared");
            true
        };

        let verified = files.iter().all(|f| f.disposition.is_verified());
        Ok(RestoreSummary {
            fault_type: record.fault_type,
            files,
            verified,
            cleaned,
        })
    }

    /// Undo an uncommitted backup after a failed injection.
    ///
    /// Puts every snapshotted file back, deletes files the injection
    /// created, and removes the snapshot storage. Best-effort: individual
    /// failures are logged and skipped, since the caller is already
    /// surfacing the error that got us here.
    pub fn roll_back(&self, pending: PendingBackup) {
        for entry in pending.into_entries() {
            let absolute = self.project_root.join(&entry.original_path);
            match entry.snapshot {
                Snapshot::File { storage_key, .. } => {
                    let storage = self.files_dir().join(&storage_key);
                    match fs::read(&storage) {
                        Ok(bytes) => {
                            if let Err(err) = atomic_write(&absolute, &bytes) {
                                warn!(
                                    path = %entry.original_path.display(),
                                    error = %err,
                                    "rollback could not rewrite target"
                                );
                            }
                        }
                        Err(err) => warn!(
                            path = %entry.original_path.display(),
                            key = %storage_key,
                            error = %err,
                            "rollback could not read snapshot"
                        ),
                    }
                }
                Snapshot::Absent => {
                    if absolute.exists() {
                        if let Err(err) = fs::remove_file(&absolute) {
                            warn!(
                                path = %entry.original_path.display(),
                                error = %err,
                                "rollback could not delete created file"
                            );
                        }
                    }
                }
            }
        }
        if let Err(err) = fs::remove_dir_all(&self.storage_root) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %self.storage_root.display(),
                    error = %err,
                    "rollback could not remove snapshot storage"
                );
            }
        }
        info!("injection rolled back from pending backup");
    }

    fn restore_file(
        &self,
        absolute: &Path,
        storage_key: &str,
        digest: &ContentDigest,
    ) -> EntryDisposition {
        let storage = self.files_dir().join(storage_key);
        let bytes = match fs::read(&storage) {
            Ok(bytes) => bytes,
            Err(e) => {
                return EntryDisposition::Failed {
                    reason: format!("cannot read snapshot '{storage_key}': {e}"),
                }
            }
        };
        if let Err(err) = atomic_write(absolute, &bytes) {
            return EntryDisposition::Failed {
                reason: err.to_string(),
            };
        }
        match fs::read(absolute) {
            Ok(after) => {
                let actual = ContentDigest::compute(&after);
                if actual == *digest {
                    EntryDisposition::Restored {
                        bytes: after.len() as u64,
                    }
                } else {
                    EntryDisposition::DigestMismatch {
                        expected: *digest,
                        actual,
                    }
                }
            }
            Err(e) => EntryDisposition::Failed {
                reason: format!("verification read failed: {e}"),
            },
        }
    }

    // Record first, storage second: a crash in between leaves a pristine
    // tree and no record, which load_active correctly reports as idle.
    fn clear_storage(&self) -> BackupResult<()> {
        let record_path = self.record_path();
        fs::remove_file(&record_path).map_err(|e| BackupError::io(&record_path, e))?;
        if let Err(err) = fs::remove_dir_all(&self.storage_root) {
            if err.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %self.storage_root.display(),
                    error = %err,
                    "snapshot storage not fully removed"
                );
            }
        }
        Ok(())
    }

    fn discard_snapshots(&self, written: &[PathBuf]) {
        for path in written {
            if let Err(err) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %err, "partial snapshot not removed");
            }
        }
        let _ = fs::remove_dir(self.files_dir());
        let _ = fs::remove_dir(&self.storage_root);
    }
}

/// Read a file's content, distinguishing "does not exist" from real errors.
///
/// A path whose nearest existing ancestor is not a directory cannot hold a
/// file, so such targets count as absent rather than unreadable.
fn read_if_present(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            if blocked_by_file_ancestor(path) {
                Ok(None)
            } else {
                Err(e)
            }
        }
    }
}

fn blocked_by_file_ancestor(path: &Path) -> bool {
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        match fs::symlink_metadata(ancestor) {
            Ok(meta) => return !meta.is_dir(),
            Err(_) => current = ancestor.parent(),
        }
    }
    false
}

/// Delete a file the injection created. A path that does not exist, or
/// cannot exist because an ancestor is a regular file, already counts as
/// removed.
fn remove_created(path: &Path) -> EntryDisposition {
    match fs::remove_file(path) {
        Ok(()) => EntryDisposition::Removed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => EntryDisposition::Removed,
        Err(e) => {
            if blocked_by_file_ancestor(path) {
                EntryDisposition::Removed
            } else {
                EntryDisposition::Failed {
                    reason: format!("cannot delete created file: {e}"),
                }
            }
        }
    }
}

/// Write a file atomically: temp file beside the destination, then rename.
fn atomic_write(path: &Path, bytes: &[u8]) -> BackupResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| BackupError::io(parent, e))?;
        }
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(BackupError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no usable file name"),
        ));
    };
    let tmp = path.with_file_name(format!(
        ".{}.tmp.{}.{}",
        name,
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    fs::write(&tmp, bytes).map_err(|e| BackupError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        BackupError::io(path, e)
    })
}

/// Stable storage file name for a snapshot: the sanitized relative path
/// plus a short digest suffix for uniqueness.
fn storage_key(path: &Path, digest: &ContentDigest) -> String {
    let mut sanitized = String::new();
    for c in path.to_string_lossy().chars() {
        match c {
            '/' | '\\' => sanitized.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => {
                sanitized.push(c);
            }
            _ => sanitized.push('_'),
        }
    }
    // sanitized is pure ASCII, so byte truncation is char-safe
    sanitized.truncate(100);
    format!("{}-{}", sanitized, digest.short())
}

fn valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}
