use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use super::calendar::{DATE_FORMAT, week_containing};
use crate::database::models::{
    AvailableHours, MAX_DAILY_HOURS, MAX_WEEKLY_HOURS, TimeEntry, TimeEntryQuery,
    ValidateTimeEntryInput, ValidationResult, ValidationRules, hours, input_hours, non_negative,
    normalize_hours, total_actual_hours, within_entry_bounds,
};
use crate::database::repositories::{TimeEntryStore, UserDirectory};
use crate::error::AppError;

/// Evaluates every rule against `existing`, the worker's other entries. Entries
/// outside the candidate's Sunday-anchored week are ignored.
pub fn evaluate(candidate: &ValidateTimeEntryInput, existing: &[TimeEntry]) -> ValidationResult {
    let mut rules = ValidationRules::default();
    let mut errors = Vec::new();

    let actual = input_hours(&candidate.actual_hours);
    let billable = input_hours(&candidate.billable_hours);

    let week = NaiveDate::parse_from_str(candidate.date.trim(), DATE_FORMAT)
        .ok()
        .and_then(|date| Some((date, week_containing(date)?)));
    if week.is_none() {
        errors.push("Invalid date format".to_string());
    }

    if !actual.as_ref().is_some_and(within_entry_bounds) {
        errors.push("Actual hours must be between 0 and 24".to_string());
    }
    if !billable.as_ref().is_some_and(within_entry_bounds) {
        errors.push("Billable hours must be between 0 and 24".to_string());
    }
    // Absurd magnitudes stop at the bounds errors
    let (Some(actual), Some(billable)) = (actual, billable) else {
        return ValidationResult {
            is_valid: false,
            validation_rules: rules,
            errors,
        };
    };
    if billable > actual {
        rules.billable_hours_valid = false;
        errors.push("Billable hours cannot exceed actual hours".to_string());
    }

    if let Some((date, (start, end))) = week {
        let same_day: Vec<&TimeEntry> = existing.iter().filter(|e| e.date == date).collect();
        let daily_current = total_actual_hours(same_day.iter().copied());
        let daily_total = &daily_current + &actual;
        if daily_total > hours(MAX_DAILY_HOURS) {
            errors.push(format!(
                "Daily hours limit exceeded. Current: {}, New: {}, Total: {}",
                daily_current, actual, daily_total
            ));
        }

        let weekly_current = total_actual_hours(
            existing
                .iter()
                .filter(|e| e.date >= start && e.date <= end),
        );
        let weekly_total = &weekly_current + &actual;
        if weekly_total > hours(MAX_WEEKLY_HOURS) {
            errors.push(format!(
                "Weekly hours limit exceeded. Current: {}, New: {}, Total: {}",
                weekly_current, actual, weekly_total
            ));
        }

        rules.no_overlap = same_day.is_empty();
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        validation_rules: rules,
        errors,
    }
}

#[derive(Clone)]
pub struct ValidationService {
    entries: Arc<dyn TimeEntryStore>,
    users: Arc<dyn UserDirectory>,
}

impl ValidationService {
    pub fn new(entries: Arc<dyn TimeEntryStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { entries, users }
    }

    /// Runs the rules for `user_id`, ignoring `exclude` (the entry being edited).
    pub async fn validate_time_entry(
        &self,
        user_id: Uuid,
        candidate: &ValidateTimeEntryInput,
        exclude: Option<Uuid>,
    ) -> Result<ValidationResult, AppError> {
        if self.users.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let existing = match NaiveDate::parse_from_str(candidate.date.trim(), DATE_FORMAT) {
            Ok(date) => {
                let mut entries = self.week_entries(user_id, date).await?;
                entries.retain(|entry| Some(entry.id) != exclude);
                entries
            }
            Err(_) => Vec::new(),
        };

        let result = evaluate(candidate, &existing);
        if !result.is_valid {
            log::debug!(
                "Time entry for user {} on {} failed validation: {:?}",
                user_id,
                candidate.date,
                result.errors
            );
        }
        Ok(result)
    }

    /// Capacity, usage, remaining and overtime hours of a worker on one day
    pub async fn available_hours(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailableHours, AppError> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let day = self
            .entries
            .query(&TimeEntryQuery::for_user_between(user_id, date, date))
            .await?;
        let available = normalize_hours(&user.available_hours);
        let used = total_actual_hours(&day.items);

        Ok(AvailableHours {
            user_id,
            date,
            remaining_hours: non_negative(&available - &used),
            overtime_hours: non_negative(&used - &available),
            available_hours: available,
            used_hours: used,
        })
    }

    async fn week_entries(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<TimeEntry>, AppError> {
        let Some((start, end)) = week_containing(date) else {
            return Ok(Vec::new());
        };
        let page = self
            .entries
            .query(&TimeEntryQuery::for_user_between(user_id, start, end))
            .await?;
        Ok(page.items)
    }
}

/// Candidate built from already-parsed fields.
pub fn candidate(
    user_id: Uuid,
    date: NaiveDate,
    actual_hours: &BigDecimal,
    billable_hours: &BigDecimal,
) -> ValidateTimeEntryInput {
    ValidateTimeEntryInput {
        user_id: Some(user_id),
        date: date.format(DATE_FORMAT).to_string(),
        actual_hours: actual_hours.clone(),
        billable_hours: billable_hours.clone(),
    }
}
