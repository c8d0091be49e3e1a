use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::Value;

use crate::features::sync::{CacheEntry, Fetched, Operation, PendingOperation};

/// Human-readable age such as `3 hours ago`.
#[must_use]
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(since);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Format a list of completion rows, marking pending ones.
#[must_use]
pub fn format_completions_pretty(fetched: &Fetched, title: &str) -> String {
    let rows: &[Value] = fetched.data.as_array().map(Vec::as_slice).unwrap_or_default();

    let mut header = format!("{} ({} items)", title, rows.len());
    if fetched.offline {
        header.push_str(&format!("  {}", "offline, cached".yellow()));
    } else if fetched.from_cache {
        header.push_str(&format!("  {}", "cached".yellow()));
    }

    if rows.is_empty() {
        return format!("{header}\n  No completions");
    }

    let mut output = header;
    output.push('\n');
    output.push_str(&"─".repeat(60));

    for row in rows {
        let pending = row.get("pending").and_then(Value::as_bool).unwrap_or(false);
        let icon = if pending { "[~]".yellow() } else { "[x]".green() };
        let assignment = row.get("assignment_id").and_then(Value::as_str).unwrap_or("?");

        let mut line = format!("{} {}", icon, assignment.bold());
        if let Some(xp) = row.get("xp_earned").and_then(Value::as_i64) {
            line.push_str(&format!("  {}", format!("+{xp} XP").cyan()));
        }
        if pending {
            line.push_str(&format!("  {}", "pending sync".dimmed()));
        }
        output.push('\n');
        output.push_str(&line);
    }

    output
}

fn describe(operation: &Operation) -> String {
    match operation {
        Operation::CompleteChore(op) => format!(
            "{} for {} on {} (+{} XP)",
            op.assignment_id, op.child_id, op.completion_date, op.xp_earned
        ),
        Operation::CompleteNightlyZone(op) => format!(
            "{} for {}, week of {} day {}",
            op.zone_id, op.child_id, op.week_start, op.day_of_week
        ),
        Operation::RequestBonusTask(op) => {
            format!("{} for {} on {}", op.task_id, op.child_id, op.completion_date)
        },
    }
}

/// Format queued operations in replay order.
#[must_use]
pub fn format_pending_pretty(operations: &[PendingOperation]) -> String {
    if operations.is_empty() {
        return "No pending operations in queue.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Pending Operations ({})", operations.len()));
    lines.push("─".repeat(60));

    for op in operations {
        lines.push(format!(
            "{:<16} {:<18} {}",
            op.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            op.operation.kind().display_name(),
            describe(&op.operation)
        ));
        lines.push(format!("{:<16} {}", "", op.id.dimmed()));
    }

    lines.join("\n")
}

/// Format cache keys with the age of each entry.
#[must_use]
pub fn format_cache_entries_pretty(
    entries: &BTreeMap<String, CacheEntry>,
    now: DateTime<Utc>,
) -> String {
    if entries.is_empty() {
        return "Cache is empty.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("Cached Queries ({})", entries.len()));
    lines.push("─".repeat(60));

    for (key, entry) in entries {
        let age = DateTime::from_timestamp_millis(entry.timestamp)
            .map_or_else(|| "unknown".to_string(), |at| format_age(at, now));
        lines.push(format!("{:<40} {}", key, age.dimmed()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone};
    use serde_json::json;

    use super::*;

    fn no_color() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 18, 0, 0).unwrap();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_age(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_age(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn test_format_completions_marks_pending() {
        no_color();
        let fetched = Fetched {
            data: json!([
                {"assignment_id": "dishes", "xp_earned": 10},
                {"assignment_id": "laundry", "xp_earned": 5, "pending": true},
            ]),
            from_cache: true,
            offline: true,
        };

        let out = format_completions_pretty(&fetched, "Today");
        assert!(out.starts_with("Today (2 items)  offline, cached"));
        assert!(out.contains("[x] dishes  +10 XP"));
        assert!(out.contains("[~] laundry  +5 XP  pending sync"));
    }

    #[test]
    fn test_format_completions_empty() {
        no_color();
        let fetched = Fetched {
            data: json!([]),
            from_cache: false,
            offline: false,
        };
        assert_eq!(
            format_completions_pretty(&fetched, "Today"),
            "Today (0 items)\n  No completions"
        );
    }

    #[test]
    fn test_format_pending() {
        no_color();
        assert_eq!(format_pending_pretty(&[]), "No pending operations in queue.");

        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let op = PendingOperation::new(Operation::complete_chore("dishes", "kid", 10, date));
        let out = format_pending_pretty(&[op]);
        assert!(out.contains("Pending Operations (1)"));
        assert!(out.contains("dishes for kid on 2024-06-12 (+10 XP)"));
    }

    #[test]
    fn test_format_cache_entries() {
        no_color();
        let now = Utc.with_ymd_and_hms(2024, 6, 12, 18, 0, 0).unwrap();
        let mut entries = BTreeMap::new();
        entries.insert(
            "completions_kid_2024-06-12".to_string(),
            CacheEntry {
                data: json!([]),
                timestamp: (now - Duration::minutes(10)).timestamp_millis(),
            },
        );

        let out = format_cache_entries_pretty(&entries, now);
        assert!(out.contains("completions_kid_2024-06-12"));
        assert!(out.contains("10 minutes ago"));
        assert_eq!(format_cache_entries_pretty(&BTreeMap::new(), now), "Cache is empty.");
    }
}
