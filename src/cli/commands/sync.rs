//! Pending queue commands.

use chrono::Utc;
use colored::Colorize;
use serde_json::json;

use crate::cli::args::{OutputFormat, SyncCommands};
use crate::error::ChoreSyncError;
use crate::features::sync::{format_sync_report, SyncEngine, SyncReport, Trigger};
use crate::output::{format_age, format_pending_pretty, to_json};

/// Execute sync subcommands.
///
/// # Errors
///
/// Returns an error if local storage fails or `clear` is not confirmed.
pub fn sync(
    engine: &SyncEngine<'_>,
    cmd: &SyncCommands,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    match cmd {
        SyncCommands::Status => show_status(engine, format),
        SyncCommands::Run => run_sync(engine, format),
        SyncCommands::List => list_operations(engine, format),
        SyncCommands::Clear { force } => clear_operations(engine, *force, format),
    }
}

fn show_status(engine: &SyncEngine<'_>, format: OutputFormat) -> Result<String, ChoreSyncError> {
    let stats = engine.stats()?;
    let online = engine.is_online();

    match format {
        OutputFormat::Json => to_json(&json!({
            "pending": stats.pending,
            "has_pending_sync": stats.pending > 0,
            "oldest_pending": stats.oldest_pending.map(|t| t.to_rfc3339()),
            "online": online,
        })),
        OutputFormat::Pretty => {
            let mut lines = Vec::new();

            lines.push("Sync Queue Status".bold().to_string());
            lines.push("─".repeat(40));

            lines.push(format!(
                "  Remote:     {}",
                if online { "online".green() } else { "offline".yellow() }
            ));
            lines.push(format!(
                "  Pending:    {} {}",
                stats.pending,
                if stats.pending > 0 {
                    "operations waiting".dimmed()
                } else {
                    "".dimmed()
                }
            ));

            if let Some(oldest) = stats.oldest_pending {
                lines.push(format!("  Oldest:     {}", format_age(oldest, Utc::now()).dimmed()));
            }

            if stats.pending > 0 {
                lines.push(String::new());
                lines.push(
                    "Run 'chore-sync sync run' to replay pending operations"
                        .dimmed()
                        .to_string(),
                );
            }

            Ok(lines.join("\n"))
        },
    }
}

fn run_sync(engine: &SyncEngine<'_>, format: OutputFormat) -> Result<String, ChoreSyncError> {
    let report = engine.on_trigger(Trigger::Manual)?.unwrap_or_default();

    match format {
        OutputFormat::Json => to_json(&report),
        OutputFormat::Pretty => Ok(format_sync_report(&report)),
    }
}

fn list_operations(engine: &SyncEngine<'_>, format: OutputFormat) -> Result<String, ChoreSyncError> {
    let operations = engine.queue().list()?;

    match format {
        OutputFormat::Json => to_json(&operations),
        OutputFormat::Pretty => Ok(format_pending_pretty(&operations)),
    }
}

fn clear_operations(
    engine: &SyncEngine<'_>,
    force: bool,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    if !force {
        return Err(ChoreSyncError::Config(
            "Use --force to drop all pending operations".to_string(),
        ));
    }

    let count = engine.pending_count()?;
    engine.queue().clear()?;
    tracing::info!(count, "pending queue cleared");

    match format {
        OutputFormat::Json => to_json(&json!({"cleared": count})),
        OutputFormat::Pretty => Ok(format!("Cleared {count} pending operations")),
    }
}

/// One-line summary used by `watch` observers.
#[must_use]
pub fn summarize(report: &SyncReport) -> String {
    if report.failed > 0 {
        format!(
            "{} {} synced, {} failed",
            "✗".red(),
            report.synced,
            report.failed
        )
    } else {
        format!("{} {} items synced", "✓".green(), report.synced)
    }
}
