//! Operation types for the pending queue.
//!
//! Each kind of offline-capable write is one variant of [`Operation`] with
//! its own payload. New kinds are added as new variants.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::generate_offline_id;

/// A child marked a chore assignment done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteChore {
    pub assignment_id: String,
    pub child_id: String,
    pub xp_earned: i64,
    /// Idempotency token, stored in the `offline_id` unique column.
    pub offline_id: String,
    /// Local calendar day the chore was done on.
    pub completion_date: NaiveDate,
}

/// A child finished a nightly cleanup zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteNightlyZone {
    pub child_id: String,
    pub zone_id: String,
    pub week_start: NaiveDate,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    pub offline_id: String,
}

/// A child asked a parent to approve a bonus task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBonusTask {
    pub task_id: String,
    pub child_id: String,
    pub week_start: NaiveDate,
    pub completion_date: NaiveDate,
    pub offline_id: String,
}

/// A write that can be queued while offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    CompleteChore(CompleteChore),
    CompleteNightlyZone(CompleteNightlyZone),
    RequestBonusTask(RequestBonusTask),
}

/// Discriminant of [`Operation`], for display and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CompleteChore,
    CompleteNightlyZone,
    RequestBonusTask,
}

impl OperationKind {
    /// Get the display name for this operation kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::CompleteChore => "Complete Chore",
            Self::CompleteNightlyZone => "Nightly Zone",
            Self::RequestBonusTask => "Bonus Request",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Operation {
    /// Create a chore completion with a fresh idempotency token.
    #[must_use]
    pub fn complete_chore(
        assignment_id: impl Into<String>,
        child_id: impl Into<String>,
        xp_earned: i64,
        completion_date: NaiveDate,
    ) -> Self {
        Self::CompleteChore(CompleteChore {
            assignment_id: assignment_id.into(),
            child_id: child_id.into(),
            xp_earned,
            offline_id: generate_offline_id(),
            completion_date,
        })
    }

    /// Create a nightly zone completion with a fresh idempotency token.
    #[must_use]
    pub fn complete_nightly_zone(
        child_id: impl Into<String>,
        zone_id: impl Into<String>,
        week_start: NaiveDate,
        day_of_week: u8,
    ) -> Self {
        Self::CompleteNightlyZone(CompleteNightlyZone {
            child_id: child_id.into(),
            zone_id: zone_id.into(),
            week_start,
            day_of_week,
            offline_id: generate_offline_id(),
        })
    }

    /// Create a bonus task request with a fresh idempotency token.
    #[must_use]
    pub fn request_bonus_task(
        task_id: impl Into<String>,
        child_id: impl Into<String>,
        week_start: NaiveDate,
        completion_date: NaiveDate,
    ) -> Self {
        Self::RequestBonusTask(RequestBonusTask {
            task_id: task_id.into(),
            child_id: child_id.into(),
            week_start,
            completion_date,
            offline_id: generate_offline_id(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::CompleteChore(_) => OperationKind::CompleteChore,
            Self::CompleteNightlyZone(_) => OperationKind::CompleteNightlyZone,
            Self::RequestBonusTask(_) => OperationKind::RequestBonusTask,
        }
    }

    /// The idempotency token carried by this write.
    #[must_use]
    pub fn offline_id(&self) -> &str {
        match self {
            Self::CompleteChore(op) => &op.offline_id,
            Self::CompleteNightlyZone(op) => &op.offline_id,
            Self::RequestBonusTask(op) => &op.offline_id,
        }
    }

    #[must_use]
    pub fn child_id(&self) -> &str {
        match self {
            Self::CompleteChore(op) => &op.child_id,
            Self::CompleteNightlyZone(op) => &op.child_id,
            Self::RequestBonusTask(op) => &op.child_id,
        }
    }
}

/// A queued operation with its local metadata.
///
/// Stored flat as `{id, type, payload, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOperation {
    /// Queue entry id, unique per device.
    pub id: String,
    #[serde(flatten)]
    pub operation: Operation,
    /// When the operation was queued.
    pub created_at: DateTime<Utc>,
}

impl PendingOperation {
    /// Wrap an operation with a fresh queue id and the current time.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            id: generate_offline_id(),
            operation,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OperationKind::CompleteChore.display_name(), "Complete Chore");
        assert_eq!(OperationKind::RequestBonusTask.to_string(), "Bonus Request");
    }

    #[test]
    fn test_constructors_assign_tokens() {
        let a = Operation::complete_chore("a1", "c1", 10, date(2024, 6, 12));
        let b = Operation::complete_chore("a1", "c1", 10, date(2024, 6, 12));

        assert_eq!(a.kind(), OperationKind::CompleteChore);
        assert_eq!(a.child_id(), "c1");
        assert!(a.offline_id().starts_with("offline_"));
        assert_ne!(a.offline_id(), b.offline_id());
    }

    #[test]
    fn test_operation_serialization_is_tagged() {
        let op = Operation::complete_nightly_zone("c1", "kitchen", date(2024, 6, 9), 3);
        let json = serde_json::to_value(&op).unwrap();

        assert_eq!(json["type"], "COMPLETE_NIGHTLY_ZONE");
        assert_eq!(json["payload"]["zoneId"], "kitchen");
        assert_eq!(json["payload"]["weekStart"], "2024-06-09");
        assert_eq!(json["payload"]["dayOfWeek"], 3);
    }

    #[test]
    fn test_pending_operation_deserialization() {
        let json = r#"{
            "id": "offline_1718200000000_abc123xyz",
            "type": "COMPLETE_CHORE",
            "payload": {
                "assignmentId": "a1",
                "childId": "c1",
                "xpEarned": 15,
                "offlineId": "offline_1718200000000_tok000000",
                "completionDate": "2024-06-12"
            },
            "createdAt": "2024-06-12T18:30:00Z"
        }"#;

        let pending: PendingOperation = serde_json::from_str(json).unwrap();
        assert_eq!(pending.operation.kind(), OperationKind::CompleteChore);
        assert_eq!(pending.operation.offline_id(), "offline_1718200000000_tok000000");
        match pending.operation {
            Operation::CompleteChore(op) => {
                assert_eq!(op.xp_earned, 15);
                assert_eq!(op.completion_date, date(2024, 6, 12));
            },
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn test_pending_operation_stored_flat() {
        let pending = PendingOperation::new(Operation::request_bonus_task(
            "wash-car",
            "c1",
            date(2024, 6, 9),
            date(2024, 6, 12),
        ));
        let json = serde_json::to_value(&pending).unwrap();

        assert_eq!(json["type"], "REQUEST_BONUS_TASK");
        assert_eq!(json["payload"]["taskId"], "wash-car");
        assert!(json["createdAt"].is_string());
        assert!(json.get("operation").is_none());

        let back: PendingOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, pending);
    }

    #[test]
    fn test_unknown_operation_type_rejected() {
        let json = r#"{"type": "DELETE_FAMILY", "payload": {}}"#;
        assert!(serde_json::from_str::<Operation>(json).is_err());
    }
}
