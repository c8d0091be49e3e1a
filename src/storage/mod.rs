//! Storage layer for chore-sync.
//!
//! Durable local persistence is a plain key-value store of string-serialized
//! JSON. The `SQLite` [`Database`] is the production implementation.

mod database;
mod migrations;

pub use database::Database;

use crate::error::ChoreSyncError;

/// Durable string key-value persistence.
///
/// Absence is never an error: `get` returns `None` and `remove` of a missing
/// key succeeds.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying store fails.
    fn get(&self, key: &str) -> Result<Option<String>, ChoreSyncError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), ChoreSyncError>;

    /// Delete the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn remove(&self, key: &str) -> Result<(), ChoreSyncError>;
}
