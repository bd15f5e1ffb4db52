use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::calendar::{parse_date, requested_week_end};
use super::time_entry::{accepted_hours, checked_hours, checked_task};
use crate::database::models::{
    ActingUser, EntryDraft, ProjectDetails, TimeEntry, WeeklyBulkInput, WeeklyBulkResult,
    WeeklyEntryUpdate, WeeklyRowInput, WeeklyUpdateInput, WeeklyUpdateResult, input_hours,
    within_entry_bounds, zero_hours,
};
use crate::database::repositories::{TimeEntryStore, UserDirectory};
use crate::error::AppError;

const DEFAULT_WEEKLY_NAME: &str = "Weekly Entry";
const DEFAULT_WEEKLY_TASK: &str = "Weekly entry";

/// Expands week grids into entries and applies lenient edits to a week.
#[derive(Clone)]
pub struct WeeklyService {
    entries: Arc<dyn TimeEntryStore>,
    users: Arc<dyn UserDirectory>,
}

impl WeeklyService {
    pub fn new(entries: Arc<dyn TimeEntryStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { entries, users }
    }

    /// Create one pending entry per non-empty cell of the grid. The whole grid is
    /// checked before anything is written; cap rules are not applied here.
    pub async fn create_weekly_bulk(
        &self,
        input: WeeklyBulkInput,
        acting: &ActingUser,
    ) -> Result<WeeklyBulkResult, AppError> {
        let owner = self
            .users
            .find_user(acting.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let week_start = input.week_start;
        let week_end = requested_week_end(week_start)?;
        let mut created = Vec::new();
        let mut skipped_count = 0;

        for row in &input.entries {
            for (day, cell) in &row.daily_hours {
                let date = parse_date(day)?;
                if date < week_start || date > week_end {
                    return Err(AppError::BadRequest(format!(
                        "Date {} is outside the week {} to {}",
                        date, week_start, week_end
                    )));
                }

                let actual_hours = accepted_hours("Actual", &cell.actual_hours)?;
                let billable_hours = accepted_hours("Billable", &cell.billable_hours)?;
                checked_hours("Actual", &actual_hours)?;
                checked_hours("Billable", &billable_hours)?;

                if actual_hours <= zero_hours() && billable_hours <= zero_hours() {
                    skipped_count += 1;
                    continue;
                }

                let task = if cell.task.trim().is_empty() {
                    DEFAULT_WEEKLY_TASK.to_string()
                } else {
                    checked_task(&cell.task)?
                };

                created.push(TimeEntry::new(
                    &owner,
                    EntryDraft {
                        date,
                        actual_hours,
                        billable_hours,
                        project_details: weekly_details(row, &task),
                        task,
                        is_billable: true,
                    },
                ));
            }
        }

        let created_count = self.entries.insert_many(&created).await?;

        log::info!(
            "Weekly bulk for user {} ({} to {}): {} created, {} skipped",
            owner.id,
            week_start,
            week_end,
            created_count,
            skipped_count
        );

        Ok(WeeklyBulkResult {
            message: "Weekly time entries created successfully".to_string(),
            created_count,
            skipped_count,
            week_start,
            week_end,
        })
    }

    /// Apply edits to the caller's pending entries of the week. Rows that cannot be
    /// applied are skipped and only show up in the count.
    pub async fn update_weekly(
        &self,
        week_start: NaiveDate,
        input: WeeklyUpdateInput,
        acting: &ActingUser,
    ) -> Result<WeeklyUpdateResult, AppError> {
        let week_end = requested_week_end(week_start)?;
        let mut updated_count = 0;

        for change in &input.entries {
            let Some(mut entry) = self.applicable_entry(change, acting, week_start, week_end).await?
            else {
                continue;
            };
            let expected_version = entry.version;

            if !apply_change(&mut entry, change) {
                log::debug!("Skipping weekly update of {}: invalid values", entry.id);
                continue;
            }

            match self.entries.update(&entry, expected_version).await {
                Ok(_) => updated_count += 1,
                Err(AppError::Conflict(reason)) | Err(AppError::NotFound(reason)) => {
                    log::warn!("Skipping weekly update of {}: {}", entry.id, reason);
                }
                Err(err) => return Err(err),
            }
        }

        log::info!(
            "Weekly update for user {} ({} to {}): {} of {} rows applied",
            acting.user_id,
            week_start,
            week_end,
            updated_count,
            input.entries.len()
        );

        Ok(WeeklyUpdateResult {
            message: "Weekly time entries updated successfully".to_string(),
            updated_count,
            week_start,
            week_end,
        })
    }

    async fn applicable_entry(
        &self,
        change: &WeeklyEntryUpdate,
        acting: &ActingUser,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Option<TimeEntry>, AppError> {
        let Ok(id) = Uuid::parse_str(change.id.trim()) else {
            return Ok(None);
        };
        let Some(entry) = self.entries.find_by_id(id).await? else {
            return Ok(None);
        };

        let applicable = entry.user_id == acting.user_id
            && entry.is_pending()
            && entry.date >= week_start
            && entry.date <= week_end;
        Ok(applicable.then_some(entry))
    }
}

/// Applies the present fields; false when a value is out of bounds.
fn apply_change(entry: &mut TimeEntry, change: &WeeklyEntryUpdate) -> bool {
    if let Some(actual_hours) = &change.actual_hours {
        match input_hours(actual_hours).filter(within_entry_bounds) {
            Some(actual_hours) => entry.set_actual_hours(&actual_hours),
            None => return false,
        }
    }
    if let Some(billable_hours) = &change.billable_hours {
        match input_hours(billable_hours).filter(within_entry_bounds) {
            Some(billable_hours) => entry.set_billable_hours(&billable_hours),
            None => return false,
        }
    }
    if let Some(task) = change.task.as_deref().filter(|t| !t.trim().is_empty()) {
        match checked_task(task) {
            Ok(task) => entry.task = task,
            Err(_) => return false,
        }
    }
    true
}

fn weekly_details(row: &WeeklyRowInput, task: &str) -> ProjectDetails {
    let (category, name) = match (row.project_id, row.product_id, row.department_id) {
        (Some(id), _, _) => ("project", id.to_string()),
        (None, Some(id), _) => ("product", id.to_string()),
        (None, None, Some(id)) => ("department", id.to_string()),
        (None, None, None) => ("general", DEFAULT_WEEKLY_NAME.to_string()),
    };

    ProjectDetails {
        category: category.to_string(),
        name,
        task: task.to_string(),
        description: task.to_string(),
    }
}
