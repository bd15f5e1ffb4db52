use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::validation::{ValidationService, candidate};
use super::week_lock::WeekLocks;
use crate::database::models::{
    ActingUser, CreateTimeEntryInput, EntryDraft, MAX_PROJECT_DETAILS_LENGTH, MAX_TASK_LENGTH,
    ProjectDetails, TimeEntry, UpdateTimeEntryInput, input_hours, within_entry_bounds,
};
use crate::database::repositories::{TimeEntryStore, UserDirectory};
use crate::error::AppError;

/// Create, read, update and delete of single entries.
#[derive(Clone)]
pub struct TimeEntryService {
    entries: Arc<dyn TimeEntryStore>,
    users: Arc<dyn UserDirectory>,
    validation: ValidationService,
    locks: WeekLocks,
    enforce_validation: bool,
}

impl TimeEntryService {
    pub fn new(
        entries: Arc<dyn TimeEntryStore>,
        users: Arc<dyn UserDirectory>,
        validation: ValidationService,
        locks: WeekLocks,
        enforce_validation: bool,
    ) -> Self {
        Self {
            entries,
            users,
            validation,
            locks,
            enforce_validation,
        }
    }

    /// Create a pending entry owned by the caller
    pub async fn create(
        &self,
        input: CreateTimeEntryInput,
        acting: &ActingUser,
    ) -> Result<TimeEntry, AppError> {
        let owner = self
            .users
            .find_user(acting.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let task = checked_task(&input.task)?;
        checked_project_details(&input.project_details)?;
        let actual_hours = accepted_hours("Actual", &input.actual_hours)?;
        let billable_hours = accepted_hours("Billable", &input.billable_hours)?;

        let _guards = self.locks.acquire(owner.id, &[input.date]).await;

        if self.enforce_validation {
            let result = self
                .validation
                .validate_time_entry(
                    owner.id,
                    &candidate(owner.id, input.date, &actual_hours, &billable_hours),
                    None,
                )
                .await?;
            if !result.is_valid {
                return Err(AppError::ValidationFailed(result));
            }
        }
        checked_hours("Actual", &actual_hours)?;
        checked_hours("Billable", &billable_hours)?;

        let entry = TimeEntry::new(
            &owner,
            EntryDraft {
                date: input.date,
                actual_hours,
                billable_hours,
                task,
                project_details: input.project_details,
                is_billable: input.is_billable,
            },
        );
        let created = self.entries.insert(&entry).await?;

        log::info!(
            "Created time entry {} for user {} on {}",
            created.id,
            created.user_id,
            created.date
        );
        Ok(created)
    }

    /// Get an entry the caller may see
    pub async fn get(&self, id: Uuid, acting: &ActingUser) -> Result<TimeEntry, AppError> {
        let entry = self.find(id).await?;
        if !acting.can_access_user(entry.user_id) {
            return Err(AppError::Forbidden(
                "Cannot view other users' time entries".to_string(),
            ));
        }
        Ok(entry)
    }

    /// Apply the present fields of `input` to a pending entry
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTimeEntryInput,
        acting: &ActingUser,
    ) -> Result<TimeEntry, AppError> {
        let current = self.find(id).await?;
        if !acting.can_access_user(current.user_id) {
            return Err(AppError::Forbidden(
                "Cannot modify other users' time entries".to_string(),
            ));
        }
        if !current.is_pending() {
            return Err(AppError::Conflict(format!(
                "Only pending time entries can be edited; this one is {}",
                current.status
            )));
        }
        if input.version.is_some_and(|version| version != current.version) {
            return Err(AppError::Conflict(
                "Time entry was modified since it was read".to_string(),
            ));
        }

        let mut entry = current.clone();
        if let Some(date) = input.date {
            entry.date = date;
        }
        if let Some(actual_hours) = &input.actual_hours {
            entry.set_actual_hours(&accepted_hours("Actual", actual_hours)?);
        }
        if let Some(billable_hours) = &input.billable_hours {
            entry.set_billable_hours(&accepted_hours("Billable", billable_hours)?);
        }
        if let Some(task) = &input.task {
            entry.task = checked_task(task)?;
        }
        if let Some(project_details) = input.project_details {
            checked_project_details(&project_details)?;
            entry.project_details = project_details;
        }
        if let Some(is_billable) = input.is_billable {
            entry.is_billable = is_billable;
        }

        let _guards = self.locks.acquire(entry.user_id, &[entry.date]).await;

        let hours_touched = input.date.is_some()
            || input.actual_hours.is_some()
            || input.billable_hours.is_some();
        if self.enforce_validation && hours_touched {
            let result = self
                .validation
                .validate_time_entry(
                    entry.user_id,
                    &candidate(
                        entry.user_id,
                        entry.date,
                        &entry.actual_hours,
                        &entry.billable_hours,
                    ),
                    Some(entry.id),
                )
                .await?;
            if !result.is_valid {
                return Err(AppError::ValidationFailed(result));
            }
        }
        checked_hours("Actual", &entry.actual_hours)?;
        checked_hours("Billable", &entry.billable_hours)?;

        let updated = self.entries.update(&entry, current.version).await?;

        log::info!("Updated time entry {} by {}", updated.id, acting.user_id);
        Ok(updated)
    }

    /// Delete an entry. Employees may only delete their own pending entries.
    pub async fn delete(&self, id: Uuid, acting: &ActingUser) -> Result<(), AppError> {
        let entry = self.find(id).await?;
        if !acting.can_access_user(entry.user_id) {
            return Err(AppError::Forbidden(
                "Cannot delete other users' time entries".to_string(),
            ));
        }
        if !acting.is_manager_or_owner() && !entry.is_pending() {
            return Err(AppError::Conflict(format!(
                "Only pending time entries can be deleted; this one is {}",
                entry.status
            )));
        }

        if !self.entries.delete(id).await? {
            return Err(AppError::NotFound("Time entry not found".to_string()));
        }

        log::info!("Deleted time entry {} by {}", id, acting.user_id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<TimeEntry, AppError> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))
    }
}

/// Trimmed, non-blank task of at most `MAX_TASK_LENGTH` characters
pub(crate) fn checked_task(task: &str) -> Result<String, AppError> {
    let task = task.trim();
    if task.is_empty() {
        return Err(AppError::BadRequest("Task is required".to_string()));
    }
    if task.chars().count() > MAX_TASK_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Task must be at most {} characters",
            MAX_TASK_LENGTH
        )));
    }
    Ok(task.to_string())
}

pub(crate) fn checked_hours(label: &str, value: &BigDecimal) -> Result<(), AppError> {
    if within_entry_bounds(value) {
        Ok(())
    } else {
        Err(hours_out_of_bounds(label))
    }
}

/// Normalized request hours; absurd magnitudes are rejected before any arithmetic.
pub(crate) fn accepted_hours(label: &str, value: &BigDecimal) -> Result<BigDecimal, AppError> {
    input_hours(value).ok_or_else(|| hours_out_of_bounds(label))
}

fn hours_out_of_bounds(label: &str) -> AppError {
    AppError::BadRequest(format!("{} hours must be between 0 and 24", label))
}

fn checked_project_details(details: &ProjectDetails) -> Result<(), AppError> {
    if details.to_blob().chars().count() > MAX_PROJECT_DETAILS_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Project details must encode to at most {} characters",
            MAX_PROJECT_DETAILS_LENGTH
        )));
    }
    Ok(())
}
