//! Error types for chore-sync.

use thiserror::Error;

/// Postgres SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors produced by the sync engine, local storage and remote client.
#[derive(Debug, Error)]
pub enum ChoreSyncError {
    /// Local `SQLite` storage failure.
    #[error("database error: {0}")]
    Database(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The remote store rejected a request or could not be reached.
    #[error("remote store error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Database error code reported by the remote store.
        code: Option<String>,
        message: String,
    },

    /// A read was requested while offline and nothing is cached for it.
    #[error("offline and no cached data available for '{0}'")]
    OfflineUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Adding XP would overflow the user's stored total.
    #[error("XP total for user {user_id} out of range ({current} + {delta})")]
    XpOverflow {
        user_id: String,
        current: i64,
        delta: i64,
    },

    /// The observer registry is full.
    #[error("observer limit of {0} reached")]
    TooManyObservers(usize),
}

impl ChoreSyncError {
    /// Build a remote error that never got a response (connection refused, timeout).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// Whether this is the remote store reporting a unique constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Remote { code: Some(code), .. } if code == UNIQUE_VIOLATION)
    }
}

impl From<rusqlite::Error> for ChoreSyncError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}
