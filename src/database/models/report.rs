use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::org::{DirectoryCounts, ProjectStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub entries_count: usize,
}

/// Totals for a span of days inside a report range (a week or a month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBreakdown {
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub actual_hours: BigDecimal,
    pub billable_hours: BigDecimal,
    pub entries_count: usize,
    pub working_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatistics {
    pub total_entries: usize,
    pub approved_entries: usize,
    pub pending_entries: usize,
    pub rejected_entries: usize,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub working_days: usize,
    pub average_hours_per_day: BigDecimal,
    pub overtime_hours: BigDecimal,
    pub approval_rate: BigDecimal,
    pub billable_rate: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub user_id: Uuid,
    pub user_name: String,
    pub period: ReportPeriod,
    pub statistics: EntryStatistics,
    pub daily_breakdown: Vec<DailyBreakdown>,
    pub weekly_breakdown: Vec<PeriodBreakdown>,
    pub monthly_breakdown: Vec<PeriodBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWeeklyReport {
    pub user_id: Uuid,
    pub user_name: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub statistics: EntryStatistics,
    pub daily_breakdown: Vec<DailyBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMonthlyReport {
    pub user_id: Uuid,
    pub user_name: String,
    /// `YYYY-MM`
    pub month: String,
    pub period: ReportPeriod,
    pub statistics: EntryStatistics,
    pub weekly_breakdown: Vec<PeriodBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberBreakdown {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub entries_count: usize,
    pub working_days: usize,
    pub overtime_hours: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBreakdown {
    pub project_id: Uuid,
    pub project_name: String,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub entries_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
    pub total_members: usize,
    pub total_entries: usize,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub average_hours_per_member: BigDecimal,
    pub approval_rate: BigDecimal,
    pub billable_rate: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    pub team_id: Uuid,
    pub team_name: String,
    pub period: ReportPeriod,
    pub statistics: TeamStatistics,
    pub member_breakdown: Vec<MemberBreakdown>,
    pub project_breakdown: Vec<ProjectBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPerformance {
    pub department_id: Uuid,
    pub department_name: String,
    pub period: ReportPeriod,
    pub team_count: usize,
    pub total_members: usize,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub average_hours_per_member: BigDecimal,
    pub billable_rate: BigDecimal,
    pub top_projects: Vec<ProjectBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPerformance {
    pub project_id: Uuid,
    pub project_name: String,
    pub status: ProjectStatus,
    pub period: ReportPeriod,
    pub team_count: usize,
    pub member_count: usize,
    pub entries_count: usize,
    pub working_days: usize,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub average_hours_per_member: BigDecimal,
    pub billable_rate: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatistics {
    pub directory: DirectoryCounts,
    pub total_time_entries: usize,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub approval_rate: BigDecimal,
    pub billable_rate: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub active_users: usize,
    pub inactive_users: usize,
    pub users_with_entries: usize,
    pub new_users_in_period: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectActivity {
    pub active_projects: usize,
    pub completed_projects: usize,
    pub average_hours_per_project: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemOverview {
    pub period: ReportPeriod,
    pub statistics: SystemStatistics,
    pub user_activity: UserActivity,
    pub project_activity: ProjectActivity,
}
