//! `SQLite` database connection and key-value access.
//!
//! The database lives at `~/.chore-sync/chore-sync.db` and holds a single
//! `kv_store` table. The pending queue and the read cache are each stored as
//! one JSON document under a well-known key.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Paths;
use crate::error::ChoreSyncError;

use super::migrations;
use super::KeyValueStore;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, ChoreSyncError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, ChoreSyncError> {
        let conn = Connection::open(path).map_err(|e| {
            ChoreSyncError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, ChoreSyncError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ChoreSyncError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    fn migrate(&self) -> Result<(), ChoreSyncError> {
        migrations::run(&self.conn)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, ChoreSyncError> {
        migrations::get_version(&self.conn)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, ChoreSyncError> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| ChoreSyncError::Database(format!("Failed to read '{key}': {e}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChoreSyncError> {
        self.conn
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                 updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| ChoreSyncError::Database(format!("Failed to write '{key}': {e}")))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ChoreSyncError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| ChoreSyncError::Database(format!("Failed to remove '{key}': {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() > 0);
    }

    #[test]
    fn test_get_set_remove() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(db.get("missing").unwrap(), None);

        db.set("k", "[1]").unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("[1]"));

        db.set("k", "[1,2]").unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("[1,2]"));

        db.remove("k").unwrap();
        assert_eq!(db.get("k").unwrap(), None);

        // removing an absent key is fine
        db.remove("k").unwrap();
    }

    #[test]
    fn test_reopen_database() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let db = Database::open_at(&db_path).unwrap();
            db.set("survives", "\"yes\"").unwrap();
        }

        {
            let db = Database::open_at(&db_path).unwrap();
            assert!(db.schema_version().unwrap() > 0);
            assert_eq!(db.get("survives").unwrap().as_deref(), Some("\"yes\""));
        }
    }
}
