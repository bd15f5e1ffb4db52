use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::models::{EntryStatus, ProjectDetails, TimeEntry};

// Row shape of `time_entries` joined with the owner's display name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub total_hours: BigDecimal,
    pub available_hours: BigDecimal,
    pub task: String,
    pub project_details: String,
    pub is_billable: bool,
    pub status: EntryStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TimeEntryRow> for TimeEntry {
    fn from(row: TimeEntryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            date: row.date,
            actual_hours: row.actual_hours,
            billable_hours: row.billable_hours,
            total_hours: row.total_hours,
            available_hours: row.available_hours,
            task: row.task,
            project_details: ProjectDetails::from_blob(&row.project_details),
            is_billable: row.is_billable,
            status: row.status,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// Row shape of `teams` with member and project ids aggregated into arrays
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub department_id: Option<Uuid>,
    pub member_ids: Vec<Uuid>,
    pub project_ids: Vec<Uuid>,
}

impl From<TeamRow> for super::models::Team {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            department_id: row.department_id,
            member_ids: row.member_ids,
            project_ids: row.project_ids,
        }
    }
}
