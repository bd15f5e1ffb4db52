use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::time_entry::EntryStatus;

/// Longest accepted approval or rejection message
pub const MAX_APPROVAL_MESSAGE_LENGTH: usize = 1000;

/// One status transition of a time entry. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHistory {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub previous_status: EntryStatus,
    pub new_status: EntryStatus,
    pub message: Option<String>,
    pub approved_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ApprovalHistory {
    pub fn new(
        entry_id: Uuid,
        previous_status: EntryStatus,
        new_status: EntryStatus,
        message: Option<String>,
        approved_by: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry_id,
            previous_status,
            new_status,
            message,
            approved_by,
            created_at: Utc::now(),
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum NotificationKind {
        Approval => "approval",
        Rejection => "rejection",
    }
}

/// Outbound notice about a decision on a worker's entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub related_entry_id: Uuid,
    pub title: String,
    pub message: String,
}
