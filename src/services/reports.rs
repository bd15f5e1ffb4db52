use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use super::aggregation::{
    approval_rate, billable_rate, daily_breakdown, member_breakdown, monthly_breakdown,
    project_breakdown, summarize, weekly_breakdown, working_days,
};
use super::calendar::{ensure_range, month_end, parse_month, requested_week_end};
use crate::database::models::{
    ActingUser, DepartmentPerformance, EntryStatus, Project, ProjectActivity, ProjectPerformance,
    ProjectStatus, ReportPeriod, SystemOverview, SystemStatistics, Team, TeamReport,
    TeamStatistics, TimeEntry, TimeEntryQuery, UserActivity, UserMonthlyReport, UserProfile,
    UserReport, UserWeeklyReport, average, sum_hours, total_actual_hours, total_billable_hours,
};
use crate::database::repositories::{OrgDirectory, TimeEntryStore, UserDirectory};
use crate::error::AppError;

const TOP_PROJECTS: usize = 10;
/// Longest report window, in days. Breakdowns hold one row per day.
pub const MAX_REPORT_DAYS: i64 = 3 * 366;

/// `[start, end]` of a report; the current calendar month when either bound is missing.
pub fn report_period(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<ReportPeriod, AppError> {
    let today = Utc::now().date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);

    let start_date = start_date.unwrap_or(first_of_month);
    let end_date = end_date.unwrap_or_else(|| month_end(start_date).unwrap_or(start_date));
    ensure_range(start_date, end_date)?;
    if end_date.signed_duration_since(start_date).num_days() >= MAX_REPORT_DAYS {
        return Err(AppError::BadRequest(format!(
            "Report period cannot exceed {} days",
            MAX_REPORT_DAYS
        )));
    }

    Ok(ReportPeriod {
        start_date,
        end_date,
    })
}

/// Assembles reports on demand from stored entries and the directory.
#[derive(Clone)]
pub struct ReportService {
    entries: Arc<dyn TimeEntryStore>,
    users: Arc<dyn UserDirectory>,
    org: Arc<dyn OrgDirectory>,
}

impl ReportService {
    pub fn new(
        entries: Arc<dyn TimeEntryStore>,
        users: Arc<dyn UserDirectory>,
        org: Arc<dyn OrgDirectory>,
    ) -> Self {
        Self {
            entries,
            users,
            org,
        }
    }

    pub async fn user_report(
        &self,
        user_id: Uuid,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<UserReport, AppError> {
        ensure_can_view_user(user_id, acting)?;
        let user = self.user(user_id).await?;
        let entries = self.entries_for(&[user.id], period).await?;

        Ok(build_user_report(&user, &entries, period))
    }

    /// Report for the seven days starting at `week_start`
    pub async fn user_weekly_report(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
        acting: &ActingUser,
    ) -> Result<UserWeeklyReport, AppError> {
        ensure_can_view_user(user_id, acting)?;
        let user = self.user(user_id).await?;
        let week_end = requested_week_end(week_start)?;
        let period = ReportPeriod {
            start_date: week_start,
            end_date: week_end,
        };
        let entries = self.entries_for(&[user.id], period).await?;

        Ok(UserWeeklyReport {
            user_id: user.id,
            user_name: user.name.clone(),
            week_start,
            week_end,
            statistics: summarize(&entries, Some(&user.available_hours)),
            daily_breakdown: daily_breakdown(&entries, week_start, week_end),
        })
    }

    /// Report for a `YYYY-MM` month
    pub async fn user_monthly_report(
        &self,
        user_id: Uuid,
        month: &str,
        acting: &ActingUser,
    ) -> Result<UserMonthlyReport, AppError> {
        let (start_date, end_date) = parse_month(month)?;
        ensure_can_view_user(user_id, acting)?;
        let user = self.user(user_id).await?;
        let period = ReportPeriod {
            start_date,
            end_date,
        };
        let entries = self.entries_for(&[user.id], period).await?;

        Ok(UserMonthlyReport {
            user_id: user.id,
            user_name: user.name.clone(),
            month: start_date.format("%Y-%m").to_string(),
            period,
            statistics: summarize(&entries, Some(&user.available_hours)),
            weekly_breakdown: weekly_breakdown(&entries, start_date, end_date),
        })
    }

    /// One report per user in the directory
    pub async fn all_users_report(
        &self,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<Vec<UserReport>, AppError> {
        ensure_manager(acting)?;
        let users = self.users.list_users().await?;
        let entries = self.entries_in(period).await?;

        Ok(users
            .iter()
            .map(|user| {
                let own: Vec<TimeEntry> = entries
                    .iter()
                    .filter(|e| e.user_id == user.id)
                    .cloned()
                    .collect();
                build_user_report(user, &own, period)
            })
            .collect())
    }

    pub async fn team_report(
        &self,
        team_id: Uuid,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<TeamReport, AppError> {
        ensure_manager(acting)?;
        let team = self.team(team_id).await?;
        let users = self.users.list_users().await?;
        let projects = self.org.list_projects().await?;

        self.build_team_report(&team, &users, &projects, period).await
    }

    /// Team report over the seven days starting at `week_start`
    pub async fn team_weekly_report(
        &self,
        team_id: Uuid,
        week_start: NaiveDate,
        acting: &ActingUser,
    ) -> Result<TeamReport, AppError> {
        let period = ReportPeriod {
            start_date: week_start,
            end_date: requested_week_end(week_start)?,
        };
        self.team_report(team_id, period, acting).await
    }

    pub async fn teams_report(
        &self,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<Vec<TeamReport>, AppError> {
        ensure_manager(acting)?;
        let teams = self.org.list_teams().await?;
        let users = self.users.list_users().await?;
        let projects = self.org.list_projects().await?;

        let mut reports = Vec::with_capacity(teams.len());
        for team in &teams {
            reports.push(
                self.build_team_report(team, &users, &projects, period)
                    .await?,
            );
        }
        Ok(reports)
    }

    /// Performance of every department, or of the one named by `department_id`
    pub async fn department_performance(
        &self,
        department_id: Option<Uuid>,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<Vec<DepartmentPerformance>, AppError> {
        ensure_manager(acting)?;
        let departments = match department_id {
            Some(id) => vec![
                self.org
                    .find_department(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?,
            ],
            None => self.org.list_departments().await?,
        };
        let teams = self.org.list_teams().await?;
        let projects = self.org.list_projects().await?;

        let mut performances = Vec::with_capacity(departments.len());
        for department in departments {
            let department_teams: Vec<&Team> = teams
                .iter()
                .filter(|team| team.department_id == Some(department.id))
                .collect();
            let members = distinct_members(department_teams.iter().copied());
            let entries = self.entries_for(&members, period).await?;

            let project_ids: HashSet<Uuid> = department_teams
                .iter()
                .flat_map(|team| team.project_ids.iter().copied())
                .collect();
            let department_projects: Vec<Project> = projects
                .iter()
                .filter(|project| project_ids.contains(&project.id))
                .cloned()
                .collect();
            let mut top_projects = project_breakdown(&entries, &department_projects);
            top_projects.truncate(TOP_PROJECTS);

            let total_actual_hours = total_actual_hours(&entries);
            let total_billable_hours = total_billable_hours(&entries);

            performances.push(DepartmentPerformance {
                department_id: department.id,
                department_name: department.name,
                period,
                team_count: department_teams.len(),
                total_members: members.len(),
                average_hours_per_member: average(&total_actual_hours, members.len()),
                billable_rate: billable_rate(&total_billable_hours, &total_actual_hours),
                total_actual_hours,
                total_billable_hours,
                top_projects,
            });
        }
        Ok(performances)
    }

    /// Performance of every project (optionally of one status), or of `project_id`
    pub async fn project_performance(
        &self,
        project_id: Option<Uuid>,
        status: Option<ProjectStatus>,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<Vec<ProjectPerformance>, AppError> {
        ensure_manager(acting)?;
        let projects = match project_id {
            Some(id) => vec![
                self.org
                    .find_project(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?,
            ],
            None => self
                .org
                .list_projects()
                .await?
                .into_iter()
                .filter(|project| status.is_none_or(|status| project.status == status))
                .collect(),
        };
        let teams = self.org.list_teams().await?;
        let entries = self.entries_in(period).await?;

        Ok(projects
            .into_iter()
            .map(|project| {
                let project_teams: Vec<&Team> = teams
                    .iter()
                    .filter(|team| team.project_ids.contains(&project.id))
                    .collect();
                let member_count = distinct_members(project_teams.iter().copied()).len();
                let attributed: Vec<&TimeEntry> = entries
                    .iter()
                    .filter(|e| e.project_details.references(project.id, &project.name))
                    .collect();

                let total_actual_hours = total_actual_hours(attributed.iter().copied());
                let total_billable_hours = total_billable_hours(attributed.iter().copied());

                ProjectPerformance {
                    project_id: project.id,
                    project_name: project.name,
                    status: project.status,
                    period,
                    team_count: project_teams.len(),
                    member_count,
                    entries_count: attributed.len(),
                    working_days: working_days(attributed.iter().copied()),
                    average_hours_per_member: average(&total_actual_hours, member_count),
                    billable_rate: billable_rate(&total_billable_hours, &total_actual_hours),
                    total_actual_hours,
                    total_billable_hours,
                }
            })
            .collect())
    }

    pub async fn system_overview(
        &self,
        period: ReportPeriod,
        acting: &ActingUser,
    ) -> Result<SystemOverview, AppError> {
        ensure_manager(acting)?;
        let directory = self.org.counts().await?;
        let users = self.users.list_users().await?;
        let projects = self.org.list_projects().await?;
        let entries = self.entries_in(period).await?;

        let total_actual_hours = total_actual_hours(&entries);
        let total_billable_hours = total_billable_hours(&entries);
        let approved = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Approved)
            .count();

        let active_users = users.iter().filter(|u| u.is_active).count();
        let users_with_entries = entries
            .iter()
            .map(|e| e.user_id)
            .collect::<BTreeSet<_>>()
            .len();
        let new_users_in_period = users
            .iter()
            .filter(|u| {
                let joined = u.created_at.date_naive();
                joined >= period.start_date && joined <= period.end_date
            })
            .count();

        let per_project = project_breakdown(&entries, &projects);
        let project_hours = sum_hours(per_project.iter().map(|p| &p.total_actual_hours));
        let count_status = |status: ProjectStatus| {
            projects.iter().filter(|p| p.status == status).count()
        };

        Ok(SystemOverview {
            period,
            statistics: SystemStatistics {
                directory,
                total_time_entries: entries.len(),
                approval_rate: approval_rate(approved, entries.len()),
                billable_rate: billable_rate(&total_billable_hours, &total_actual_hours),
                total_actual_hours,
                total_billable_hours,
            },
            user_activity: UserActivity {
                active_users,
                inactive_users: users.len() - active_users,
                users_with_entries,
                new_users_in_period,
            },
            project_activity: ProjectActivity {
                active_projects: count_status(ProjectStatus::Active),
                completed_projects: count_status(ProjectStatus::Completed),
                average_hours_per_project: average(&project_hours, projects.len()),
            },
        })
    }

    async fn build_team_report(
        &self,
        team: &Team,
        users: &[UserProfile],
        projects: &[Project],
        period: ReportPeriod,
    ) -> Result<TeamReport, AppError> {
        let members: Vec<UserProfile> = users
            .iter()
            .filter(|user| team.member_ids.contains(&user.id))
            .cloned()
            .collect();
        let member_ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
        let entries = self.entries_for(&member_ids, period).await?;

        let team_projects: Vec<Project> = projects
            .iter()
            .filter(|project| team.project_ids.contains(&project.id))
            .cloned()
            .collect();

        let overall = summarize(&entries, None);
        let statistics = TeamStatistics {
            total_members: members.len(),
            total_entries: overall.total_entries,
            average_hours_per_member: average(&overall.total_actual_hours, members.len()),
            approval_rate: overall.approval_rate,
            billable_rate: overall.billable_rate,
            total_actual_hours: overall.total_actual_hours,
            total_billable_hours: overall.total_billable_hours,
        };

        Ok(TeamReport {
            team_id: team.id,
            team_name: team.name.clone(),
            period,
            statistics,
            member_breakdown: member_breakdown(&entries, &members),
            project_breakdown: project_breakdown(&entries, &team_projects),
        })
    }

    async fn entries_for(
        &self,
        user_ids: &[Uuid],
        period: ReportPeriod,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let query = TimeEntryQuery {
            user_ids: Some(user_ids.to_vec()),
            ..TimeEntryQuery::between(period.start_date, period.end_date)
        };
        Ok(self.entries.query(&query).await?.items)
    }

    async fn entries_in(&self, period: ReportPeriod) -> Result<Vec<TimeEntry>, AppError> {
        let query = TimeEntryQuery::between(period.start_date, period.end_date);
        Ok(self.entries.query(&query).await?.items)
    }

    async fn user(&self, id: Uuid) -> Result<UserProfile, AppError> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn team(&self, id: Uuid) -> Result<Team, AppError> {
        self.org
            .find_team(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
    }
}

fn build_user_report(user: &UserProfile, entries: &[TimeEntry], period: ReportPeriod) -> UserReport {
    UserReport {
        user_id: user.id,
        user_name: user.name.clone(),
        period,
        statistics: summarize(entries, Some(&user.available_hours)),
        daily_breakdown: daily_breakdown(entries, period.start_date, period.end_date),
        weekly_breakdown: weekly_breakdown(entries, period.start_date, period.end_date),
        monthly_breakdown: monthly_breakdown(entries, period.start_date, period.end_date),
    }
}

fn distinct_members<'a, I>(teams: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = &'a Team>,
{
    teams
        .into_iter()
        .flat_map(|team| team.member_ids.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn ensure_can_view_user(user_id: Uuid, acting: &ActingUser) -> Result<(), AppError> {
    if acting.can_access_user(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Cannot view reports of other users".to_string(),
        ))
    }
}

fn ensure_manager(acting: &ActingUser) -> Result<(), AppError> {
    if acting.is_manager_or_owner() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only managers and owners can view organisation reports".to_string(),
        ))
    }
}
