//! Chore chart mutations and queries against the remote store.
//!
//! Each write is an insert guarded by a unique constraint, so replaying the
//! same operation is reported as [`InsertOutcome::Duplicate`] instead of
//! creating a second row.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{Filter, InsertOutcome, RemoteStore};
use crate::core::{format_date, week_start};
use crate::error::ChoreSyncError;
use crate::features::sync::operation::{CompleteChore, CompleteNightlyZone, RequestBonusTask};

pub const CHORE_COMPLETIONS: &str = "chore_completions";
pub const NIGHTLY_COMPLETIONS: &str = "nightly_completions";
pub const BONUS_TASK_COMPLETIONS: &str = "bonus_task_completions";
pub const USERS: &str = "users";

/// Cache key for one child's completions on one day.
#[must_use]
pub fn completions_cache_key(child_id: &str, date: NaiveDate) -> String {
    format!("completions_{child_id}_{}", format_date(date))
}

/// Record a chore completion and award its XP.
///
/// XP is only awarded when a new row was created. A failed award is logged
/// and does not fail the completion: the row already exists and a retry
/// would only hit the unique constraint.
///
/// # Errors
///
/// Returns an error if the insert fails for any reason other than a duplicate.
pub fn complete_chore(
    store: &dyn RemoteStore,
    op: &CompleteChore,
) -> Result<InsertOutcome, ChoreSyncError> {
    let row = json!({
        "assignment_id": op.assignment_id,
        "child_id": op.child_id,
        "completion_date": format_date(op.completion_date),
        "week_start": format_date(week_start(op.completion_date)),
        "xp_earned": op.xp_earned,
        "offline_id": op.offline_id,
    });

    let outcome = store.insert(CHORE_COMPLETIONS, &row)?;
    if matches!(outcome, InsertOutcome::Created(_)) {
        if let Err(e) = award_xp(store, &op.child_id, op.xp_earned) {
            tracing::warn!(
                child_id = %op.child_id,
                offline_id = %op.offline_id,
                error = %e,
                "completion recorded but XP award failed"
            );
        }
    }
    Ok(outcome)
}

/// Add `delta` to a user's `current_xp` and return the new total.
///
/// # Errors
///
/// Returns [`ChoreSyncError::NotFound`] if the user does not exist,
/// [`ChoreSyncError::XpOverflow`] if the new total does not fit, or any
/// remote error.
pub fn award_xp(store: &dyn RemoteStore, user_id: &str, delta: i64) -> Result<i64, ChoreSyncError> {
    let user = store
        .select(USERS, &Filter::new().equals("id", user_id))?
        .into_iter()
        .next()
        .ok_or_else(|| ChoreSyncError::NotFound(format!("user {user_id}")))?;

    let current = user.get("current_xp").and_then(Value::as_i64).unwrap_or(0);
    let total = current
        .checked_add(delta)
        .ok_or_else(|| ChoreSyncError::XpOverflow {
            user_id: user_id.to_string(),
            current,
            delta,
        })?;
    store.update(USERS, user_id, &json!({ "current_xp": total }))?;

    tracing::debug!(user_id, delta, total, "awarded XP");
    Ok(total)
}

/// Record a nightly zone completion. Unique per child, zone, week and day,
/// and by `offline_id`.
///
/// # Errors
///
/// Returns an error if the insert fails for any reason other than a duplicate.
pub fn complete_nightly_zone(
    store: &dyn RemoteStore,
    op: &CompleteNightlyZone,
) -> Result<InsertOutcome, ChoreSyncError> {
    let row = json!({
        "child_id": op.child_id,
        "zone_id": op.zone_id,
        "week_start": format_date(op.week_start),
        "day_of_week": op.day_of_week,
        "offline_id": op.offline_id,
    });
    store.insert(NIGHTLY_COMPLETIONS, &row)
}

/// Submit a bonus task for parent approval.
///
/// The row starts as `pending` with nothing earned; XP and money are set
/// when a parent approves it. Unique per task, child and day, and by
/// `offline_id`.
///
/// # Errors
///
/// Returns an error if the insert fails for any reason other than a duplicate.
pub fn request_bonus_task(
    store: &dyn RemoteStore,
    op: &RequestBonusTask,
) -> Result<InsertOutcome, ChoreSyncError> {
    let row = json!({
        "bonus_task_id": op.task_id,
        "child_id": op.child_id,
        "week_start": format_date(op.week_start),
        "completion_date": format_date(op.completion_date),
        "status": "pending",
        "xp_earned": 0,
        "amount_earned": 0,
        "offline_id": op.offline_id,
    });
    store.insert(BONUS_TASK_COMPLETIONS, &row)
}

/// Fetch a child's chore completions for one day.
///
/// # Errors
///
/// Returns an error if the select fails.
pub fn todays_completions(
    store: &dyn RemoteStore,
    child_id: &str,
    date: NaiveDate,
) -> Result<Vec<Value>, ChoreSyncError> {
    store.select(
        CHORE_COMPLETIONS,
        &Filter::new()
            .equals("child_id", child_id)
            .equals("completion_date", format_date(date)),
    )
}
