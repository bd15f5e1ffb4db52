use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_entry::TimeEntry;

/// Hours for one cell of the week grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHoursInput {
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    #[serde(default)]
    pub task: String,
}

/// One row of the week grid: what the hours were spent on and the hours per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRowInput {
    pub project_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    /// Keyed by `YYYY-MM-DD`
    #[serde(default)]
    pub daily_hours: BTreeMap<String, DailyHoursInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBulkInput {
    pub week_start: NaiveDate,
    #[serde(default)]
    pub entries: Vec<WeeklyRowInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBulkResult {
    pub message: String,
    pub created_count: usize,
    pub skipped_count: usize,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEntryUpdate {
    /// Kept as text; ids that do not parse are skipped
    pub id: String,
    pub actual_hours: Option<BigDecimal>,
    pub billable_hours: Option<BigDecimal>,
    pub task: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyUpdateInput {
    #[serde(default)]
    pub entries: Vec<WeeklyEntryUpdate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyUpdateResult {
    pub message: String,
    pub updated_count: usize,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    pub date: NaiveDate,
    pub day_name: String,
    pub entries: Vec<TimeEntry>,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub total_entries: usize,
    pub pending_entries: usize,
    pub approved_entries: usize,
    pub rejected_entries: usize,
}

/// Seven-day grid of a worker's entries, or of everyone's when `user_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyView {
    pub user_id: Option<Uuid>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<WeekDay>,
    pub weekly_summary: WeeklySummary,
}
