//! JSON output formatting.

use serde::Serialize;

use crate::error::ChoreSyncError;

/// Serialize any value as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ChoreSyncError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, ChoreSyncError> {
    Ok(serde_json::to_string_pretty(value)?)
}
