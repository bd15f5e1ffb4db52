use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hours::{normalize_hours, sum_hours};
use super::macros::string_enum;
use super::user::UserProfile;

/// Longest accepted task description
pub const MAX_TASK_LENGTH: usize = 1000;
/// Longest accepted encoded project-details blob
pub const MAX_PROJECT_DETAILS_LENGTH: usize = 4000;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum EntryStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// What the hours were spent on. Persisted as a JSON text blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDetails {
    pub category: String,
    pub name: String,
    pub task: String,
    pub description: String,
}

impl ProjectDetails {
    pub fn to_blob(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Undecodable blobs read back as empty details.
    pub fn from_blob(blob: &str) -> Self {
        match serde_json::from_str(blob) {
            Ok(details) => details,
            Err(err) => {
                log::warn!("Undecodable project details, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Whether these details attribute the hours to the given project.
    pub fn references(&self, project_id: Uuid, project_name: &str) -> bool {
        let name = self.name.trim();
        !name.is_empty()
            && (name.eq_ignore_ascii_case(project_name.trim())
                || name.eq_ignore_ascii_case(&project_id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Display name hydrated from the user directory on read
    pub user_name: String,
    pub date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub total_hours: BigDecimal,
    pub available_hours: BigDecimal,
    pub task: String,
    pub project_details: ProjectDetails,
    pub is_billable: bool,
    pub status: EntryStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller for a new entry, already checked and normalised.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub task: String,
    pub project_details: ProjectDetails,
    pub is_billable: bool,
}

impl TimeEntry {
    /// A fresh pending entry owned by `owner`, with the owner's capacity captured.
    pub fn new(owner: &UserProfile, draft: EntryDraft) -> Self {
        let now = Utc::now();
        let actual_hours = normalize_hours(&draft.actual_hours);

        Self {
            id: Uuid::new_v4(),
            user_id: owner.id,
            user_name: owner.name.clone(),
            date: draft.date,
            total_hours: actual_hours.clone(),
            actual_hours,
            billable_hours: normalize_hours(&draft.billable_hours),
            available_hours: normalize_hours(&owner.available_hours),
            task: draft.task,
            project_details: draft.project_details,
            is_billable: draft.is_billable,
            status: EntryStatus::Pending,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }

    pub fn set_actual_hours(&mut self, value: &BigDecimal) {
        self.actual_hours = normalize_hours(value);
        self.total_hours = self.actual_hours.clone();
    }

    pub fn set_billable_hours(&mut self, value: &BigDecimal) {
        self.billable_hours = normalize_hours(value);
    }
}

pub fn total_actual_hours<'a, I>(entries: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    sum_hours(entries.into_iter().map(|entry| &entry.actual_hours))
}

pub fn total_billable_hours<'a, I>(entries: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    sum_hours(entries.into_iter().map(|entry| &entry.billable_hours))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimeEntryInput {
    pub date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub task: String,
    #[serde(default)]
    pub project_details: ProjectDetails,
    #[serde(default = "default_true")]
    pub is_billable: bool,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimeEntryInput {
    pub date: Option<NaiveDate>,
    pub actual_hours: Option<BigDecimal>,
    pub billable_hours: Option<BigDecimal>,
    pub task: Option<String>,
    pub project_details: Option<ProjectDetails>,
    pub is_billable: Option<bool>,
    /// Version the caller last read; a mismatch is a conflict
    pub version: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecisionInput {
    pub message: Option<String>,
}
