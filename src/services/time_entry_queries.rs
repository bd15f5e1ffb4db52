use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::aggregation::working_days;
use super::calendar::{days_between, ensure_range, requested_week_end};
use crate::database::models::{
    ActingUser, EntryStatus, FilterResults, FilterSummary, Page, Project, SearchResults,
    StatusForDate, TimeEntry, TimeEntryQuery, WeekDay, WeeklySummary, WeeklyView, average,
    total_actual_hours, total_billable_hours,
};
use crate::database::repositories::{OrgDirectory, TimeEntryStore};
use crate::error::AppError;

/// Read-only listings over time entries, scoped to what the caller may see.
#[derive(Clone)]
pub struct TimeEntryQueryService {
    entries: Arc<dyn TimeEntryStore>,
    directory: Arc<dyn OrgDirectory>,
}

impl TimeEntryQueryService {
    pub fn new(entries: Arc<dyn TimeEntryStore>, directory: Arc<dyn OrgDirectory>) -> Self {
        Self { entries, directory }
    }

    /// One page of entries matching `query`
    pub async fn list(
        &self,
        mut query: TimeEntryQuery,
        acting: &ActingUser,
    ) -> Result<Page<TimeEntry>, AppError> {
        check_dates(&query)?;
        query.user_id = acting.scope_user(query.user_id);
        query.pagination = Some(query.pagination.unwrap_or_default());
        self.entries.query(&query).await
    }

    /// Every entry matching `query`, optionally attributed to `project_id`, with hour totals
    pub async fn filter(
        &self,
        mut query: TimeEntryQuery,
        project_id: Option<Uuid>,
        acting: &ActingUser,
    ) -> Result<FilterResults, AppError> {
        check_dates(&query)?;
        query.user_id = acting.scope_user(query.user_id);
        query.pagination = None;
        let mut results = self.entries.query(&query).await?.items;
        if let Some(project_id) = project_id {
            let project = self.project(project_id).await?;
            results = attributed_to(results, &project);
        }

        let total_actual_hours = total_actual_hours(&results);
        let summary = FilterSummary {
            average_hours_per_day: average(&total_actual_hours, working_days(&results)),
            total_billable_hours: total_billable_hours(&results),
            total_actual_hours,
        };

        Ok(FilterResults {
            total_results: results.len(),
            results,
            summary,
        })
    }

    /// Entries whose task or project details contain `term`
    pub async fn search(
        &self,
        term: &str,
        user_id: Option<Uuid>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        acting: &ActingUser,
    ) -> Result<SearchResults, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::BadRequest("Search query is required".to_string()));
        }

        let query = TimeEntryQuery {
            user_id: acting.scope_user(user_id),
            start_date,
            end_date,
            search: Some(term.to_string()),
            ..Default::default()
        };
        check_dates(&query)?;
        let results = self.entries.query(&query).await?.items;

        Ok(SearchResults {
            query: term.to_string(),
            total_results: results.len(),
            results,
        })
    }

    /// Totals and distinct statuses of one worker's day
    pub async fn status_for_date(
        &self,
        date: NaiveDate,
        user_id: Option<Uuid>,
        acting: &ActingUser,
    ) -> Result<StatusForDate, AppError> {
        let user_id = self.accessible_user(user_id, acting)?;
        let entries = self.between(Some(user_id), date, date).await?;

        let statuses: BTreeSet<EntryStatus> = entries.iter().map(|e| e.status).collect();

        Ok(StatusForDate {
            date,
            has_entries: !entries.is_empty(),
            total_actual_hours: total_actual_hours(&entries),
            total_billable_hours: total_billable_hours(&entries),
            entries_count: entries.len(),
            statuses: statuses.into_iter().collect(),
            entries,
        })
    }

    /// Entries of one day; every worker's for owners and managers
    pub async fn by_date(
        &self,
        date: NaiveDate,
        user_id: Option<Uuid>,
        acting: &ActingUser,
    ) -> Result<Vec<TimeEntry>, AppError> {
        self.between(acting.scope_user(user_id), date, date).await
    }

    /// Entries of one worker, optionally limited to a range
    pub async fn by_user(
        &self,
        user_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        acting: &ActingUser,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let user_id = self.accessible_user(Some(user_id), acting)?;
        let query = TimeEntryQuery {
            user_id: Some(user_id),
            start_date,
            end_date,
            ..Default::default()
        };
        check_dates(&query)?;
        Ok(self.entries.query(&query).await?.items)
    }

    /// Entries attributed to a project, optionally limited to a range
    pub async fn by_project(
        &self,
        project_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        acting: &ActingUser,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let project = self.project(project_id).await?;
        let query = TimeEntryQuery {
            user_id: acting.scope_user(None),
            start_date,
            end_date,
            ..Default::default()
        };
        check_dates(&query)?;
        let entries = self.entries.query(&query).await?.items;

        Ok(attributed_to(entries, &project))
    }

    /// Entries inside `[start_date, end_date]`, optionally for one worker or project
    pub async fn range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        user_id: Option<Uuid>,
        project_id: Option<Uuid>,
        acting: &ActingUser,
    ) -> Result<Vec<TimeEntry>, AppError> {
        ensure_range(start_date, end_date)?;
        let entries = self
            .between(acting.scope_user(user_id), start_date, end_date)
            .await?;

        match project_id {
            Some(project_id) => {
                let project = self.project(project_id).await?;
                Ok(attributed_to(entries, &project))
            }
            None => Ok(entries),
        }
    }

    /// Seven-day grid starting at `week_start`. Without `user_id` employees see
    /// their own week and managers see everyone's.
    pub async fn weekly_view(
        &self,
        week_start: NaiveDate,
        user_id: Option<Uuid>,
        acting: &ActingUser,
    ) -> Result<WeeklyView, AppError> {
        let user_id = match user_id {
            Some(user_id) => Some(self.accessible_user(Some(user_id), acting)?),
            None => acting.scope_user(None),
        };
        let week_end = requested_week_end(week_start)?;
        let entries = self.between(user_id, week_start, week_end).await?;

        let days = days_between(week_start, week_end)
            .map(|date| {
                let day: Vec<TimeEntry> =
                    entries.iter().filter(|e| e.date == date).cloned().collect();
                WeekDay {
                    date,
                    day_name: date.format("%A").to_string(),
                    total_actual_hours: total_actual_hours(&day),
                    total_billable_hours: total_billable_hours(&day),
                    entries: day,
                }
            })
            .collect();

        let count = |status: EntryStatus| entries.iter().filter(|e| e.status == status).count();
        let weekly_summary = WeeklySummary {
            total_actual_hours: total_actual_hours(&entries),
            total_billable_hours: total_billable_hours(&entries),
            total_entries: entries.len(),
            pending_entries: count(EntryStatus::Pending),
            approved_entries: count(EntryStatus::Approved),
            rejected_entries: count(EntryStatus::Rejected),
        };

        Ok(WeeklyView {
            user_id,
            week_start,
            week_end,
            days,
            weekly_summary,
        })
    }

    fn accessible_user(&self, user_id: Option<Uuid>, acting: &ActingUser) -> Result<Uuid, AppError> {
        let user_id = user_id.unwrap_or(acting.user_id);
        if !acting.can_access_user(user_id) {
            return Err(AppError::Forbidden(
                "Cannot view other users' time entries".to_string(),
            ));
        }
        Ok(user_id)
    }

    async fn between(
        &self,
        user_id: Option<Uuid>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<TimeEntry>, AppError> {
        let query = TimeEntryQuery {
            user_id,
            ..TimeEntryQuery::between(start_date, end_date)
        };
        Ok(self.entries.query(&query).await?.items)
    }

    async fn project(&self, project_id: Uuid) -> Result<Project, AppError> {
        self.directory
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }
}

fn attributed_to(entries: Vec<TimeEntry>, project: &Project) -> Vec<TimeEntry> {
    entries
        .into_iter()
        .filter(|e| e.project_details.references(project.id, &project.name))
        .collect()
}

fn check_dates(query: &TimeEntryQuery) -> Result<(), AppError> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => ensure_range(start, end),
        _ => Ok(()),
    }
}
