//! Harness configuration

use std::path::{Path, PathBuf};

/// Default backup directory, relative to the project root.
pub const DEFAULT_BACKUP_DIR: &str = ".faultline-backup";

/// Default template directory, relative to the working directory.
pub const DEFAULT_TEMPLATES_ROOT: &str = "templates";

/// Where the harness finds the project, its templates, and backup storage.
///
/// `backup_dir` is project state, so a relative value resolves under the
/// project root. `templates_root` belongs to the harness installation,
/// not the target project, so a relative value resolves against the
/// working directory as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Root of the project tree faults are injected into
    pub project_root: PathBuf,
    /// Backup storage directory
    pub backup_dir: PathBuf,
    /// Directory holding the fault template files
    pub templates_root: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            templates_root: PathBuf::from(DEFAULT_TEMPLATES_ROOT),
        }
    }
}

impl HarnessConfig {
    /// Configuration for a project tree, with default backup and
    /// template locations.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Override the backup storage directory.
    #[inline]
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Override the template directory.
    #[inline]
    #[must_use]
    pub fn with_templates_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_root = dir.into();
        self
    }

    /// The backup directory resolved against a (canonicalized) project
    /// root. Absolute values are taken as-is.
    #[must_use]
    pub fn backup_storage_path(&self, project_root: &Path) -> PathBuf {
        if self.backup_dir.is_absolute() {
            self.backup_dir.clone()
        } else {
            project_root.join(&self.backup_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_working_directory() {
        let config = HarnessConfig::default();
        assert_eq!(config.project_root, PathBuf::from("."));
        assert_eq!(config.backup_dir, PathBuf::from(DEFAULT_BACKUP_DIR));
        assert_eq!(config.templates_root, PathBuf::from(DEFAULT_TEMPLATES_ROOT));
    }

    #[test]
    fn relative_backup_dir_resolves_under_project_root() {
        let config = HarnessConfig::new("/srv/app");
        assert_eq!(
            config.backup_storage_path(Path::new("/srv/app")),
            PathBuf::from("/srv/app/.faultline-backup")
        );
    }

    #[test]
    fn absolute_backup_dir_is_used_verbatim() {
        let config = HarnessConfig::new("/srv/app").with_backup_dir("/var/tmp/faultline");
        assert_eq!(
            config.backup_storage_path(Path::new("/srv/app")),
            PathBuf::from("/var/tmp/faultline")
        );
    }

    #[test]
    fn builders_chain() {
        let config = HarnessConfig::new("demo")
            .with_backup_dir("state/backup")
            .with_templates_root("assets/templates");
        assert_eq!(config.project_root, PathBuf::from("demo"));
        assert_eq!(config.backup_dir, PathBuf::from("state/backup"));
        assert_eq!(config.templates_root, PathBuf::from("assets/templates"));
    }
}
