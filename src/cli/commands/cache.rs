//! Read cache commands.

use chrono::Utc;
use serde_json::json;

use crate::cli::args::{CacheCommands, OutputFormat};
use crate::error::ChoreSyncError;
use crate::features::sync::{MaxAge, SyncEngine};
use crate::output::{format_cache_entries_pretty, to_json};

/// Execute cache subcommands.
///
/// # Errors
///
/// Returns an error if local storage fails or the key is not cached.
pub fn cache(
    engine: &SyncEngine<'_>,
    cmd: &CacheCommands,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let cache = engine.cache();

    match cmd {
        CacheCommands::List => {
            let entries = cache.entries()?;
            match format {
                OutputFormat::Json => to_json(&entries),
                OutputFormat::Pretty => Ok(format_cache_entries_pretty(&entries, Utc::now())),
            }
        },
        CacheCommands::Get { key } => {
            let data = cache
                .get(key, MaxAge::Unbounded)?
                .ok_or_else(|| ChoreSyncError::NotFound(format!("cache entry '{key}'")))?;
            to_json(&data)
        },
        CacheCommands::Clear => {
            cache.clear()?;
            match format {
                OutputFormat::Json => to_json(&json!({"cleared": true})),
                OutputFormat::Pretty => Ok("Cache cleared".to_string()),
            }
        },
    }
}
