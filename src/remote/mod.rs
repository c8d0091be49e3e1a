//! Remote store access.
//!
//! The remote store is a relational database reachable over the network. It
//! owns all canonical state; this crate only consumes four table operations
//! through [`RemoteStore`] and asks [`Connectivity`] whether it is reachable.

pub mod chores;
mod postgrest;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::error::ChoreSyncError;

pub use postgrest::PostgrestClient;

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// A new row was persisted.
    Created(Value),
    /// The constraint was already satisfied by an earlier write.
    Duplicate,
}

/// Equality filter over columns, all conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Require `column` to equal `value`.
    #[must_use]
    pub fn equals(mut self, column: &str, value: impl ToString) -> Self {
        self.conditions.push((column.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Whether a JSON row satisfies every condition.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|(column, expected)| match row.get(column) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        })
    }
}

/// Table-based CRUD against the remote store.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteStore {
    /// Insert a row, reporting a unique constraint violation as [`InsertOutcome::Duplicate`].
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than a duplicate.
    fn insert(&self, table: &str, row: &Value) -> Result<InsertOutcome, ChoreSyncError>;

    /// Patch the row with the given id and return the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreSyncError::NotFound`] if no row has that id.
    fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ChoreSyncError>;

    /// Select all rows matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ChoreSyncError>;

    /// Delete all rows matching the filter and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, ChoreSyncError>;
}

/// Network reachability signal.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Connectivity flag set by hand.
///
/// Used for `--offline` and for driving transitions in tests.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}

/// Stand-in used when no remote store is configured.
///
/// Always offline; every remote call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

impl Disconnected {
    fn unavailable() -> ChoreSyncError {
        ChoreSyncError::transport("no remote store configured")
    }
}

impl RemoteStore for Disconnected {
    fn insert(&self, _table: &str, _row: &Value) -> Result<InsertOutcome, ChoreSyncError> {
        Err(Self::unavailable())
    }

    fn update(&self, _table: &str, _id: &str, _patch: &Value) -> Result<Value, ChoreSyncError> {
        Err(Self::unavailable())
    }

    fn select(&self, _table: &str, _filter: &Filter) -> Result<Vec<Value>, ChoreSyncError> {
        Err(Self::unavailable())
    }

    fn delete(&self, _table: &str, _filter: &Filter) -> Result<usize, ChoreSyncError> {
        Err(Self::unavailable())
    }
}

impl Connectivity for Disconnected {
    fn is_online(&self) -> bool {
        false
    }
}
