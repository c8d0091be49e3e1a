//! Chore write and read commands.

use std::time::Duration;

use colored::Colorize;
use serde_json::json;

use crate::cli::args::{CompleteArgs, NightlyArgs, OutputFormat, RequestBonusArgs, TodayArgs};
use crate::core::{local_today, week_start};
use crate::error::ChoreSyncError;
use crate::features::sync::{Operation, PendingOperation, SyncEngine};
use crate::output::{format_completions_pretty, to_json};

fn queued_message(engine: &SyncEngine<'_>, what: &str) -> Result<String, ChoreSyncError> {
    let pending = engine.pending_count()?;
    Ok(if pending == 0 {
        format!("{} {what} synced", "✓".green())
    } else {
        format!(
            "{} {what} queued {}",
            "○".yellow(),
            format!("({pending} pending)").dimmed()
        )
    })
}

/// Complete a chore for today through the offline path.
///
/// # Errors
///
/// Returns an error if local storage fails.
pub fn complete(
    engine: &SyncEngine<'_>,
    args: &CompleteArgs,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let offline_id = engine.complete_chore_offline(&args.assignment_id, &args.child, args.xp)?;

    match format {
        OutputFormat::Json => to_json(&json!({
            "offline_id": offline_id,
            "pending": engine.pending_count()?,
        })),
        OutputFormat::Pretty => queued_message(engine, &format!("Chore {}", args.assignment_id)),
    }
}

fn submitted(
    engine: &SyncEngine<'_>,
    pending: &PendingOperation,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "id": pending.id,
            "offline_id": pending.operation.offline_id(),
            "pending": engine.pending_count()?,
        })),
        OutputFormat::Pretty => queued_message(engine, pending.operation.kind().display_name()),
    }
}

/// Queue a nightly zone completion for the current week.
///
/// # Errors
///
/// Returns an error if local storage fails.
pub fn nightly(
    engine: &SyncEngine<'_>,
    args: &NightlyArgs,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let operation = Operation::complete_nightly_zone(
        &args.child,
        &args.zone,
        week_start(local_today()),
        args.day,
    );
    let pending = engine.submit(operation)?;
    submitted(engine, &pending, format)
}

/// Queue a bonus task request dated today.
///
/// # Errors
///
/// Returns an error if local storage fails.
pub fn request_bonus(
    engine: &SyncEngine<'_>,
    args: &RequestBonusArgs,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let today = local_today();
    let operation = Operation::request_bonus_task(&args.task, &args.child, week_start(today), today);
    let pending = engine.submit(operation)?;
    submitted(engine, &pending, format)
}

/// Show today's completions for a child.
///
/// # Errors
///
/// Returns an error if the data is unavailable both remotely and locally.
pub fn today(
    engine: &SyncEngine<'_>,
    args: &TodayArgs,
    default_max_age: Duration,
    format: OutputFormat,
) -> Result<String, ChoreSyncError> {
    let max_age = args.max_age.map_or(default_max_age, Duration::from_secs);
    let fetched = engine.todays_completions(&args.child, max_age)?;

    match format {
        OutputFormat::Json => to_json(&fetched),
        OutputFormat::Pretty => Ok(format_completions_pretty(
            &fetched,
            &format!("Today for {}", args.child),
        )),
    }
}
