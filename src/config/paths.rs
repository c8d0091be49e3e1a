//! Path resolution for chore-sync configuration and data files.
//!
//! All data is stored in `~/.chore-sync/` unless `CHORE_SYNC_HOME` is set:
//! - `config.yaml` - Main configuration file
//! - `chore-sync.db` - SQLite database holding the pending queue and read cache

use std::path::PathBuf;

use crate::error::ChoreSyncError;

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "CHORE_SYNC_HOME";

/// Paths to chore-sync configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.chore-sync/`
    pub root: PathBuf,
    /// Config file: `~/.chore-sync/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.chore-sync/chore-sync.db`
    pub database: PathBuf,
}

impl Paths {
    /// Resolve paths from `CHORE_SYNC_HOME`, falling back to the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set.
    pub fn new() -> Result<Self, ChoreSyncError> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            ChoreSyncError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".chore-sync")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("chore-sync.db"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), ChoreSyncError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                ChoreSyncError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_with_root() {
        let root = PathBuf::from("/tmp/test-chore-sync");
        let paths = Paths::with_root(root.clone());

        assert_eq!(paths.root, root);
        assert_eq!(paths.config_file, root.join("config.yaml"));
        assert_eq!(paths.database, root.join("chore-sync.db"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_root(temp_dir.path().join("nested").join("root"));

        paths.ensure_dirs().unwrap();
        assert!(paths.root.exists());
    }
}
