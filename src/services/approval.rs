use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{
    ActingUser, ApprovalHistory, EntryStatus, MAX_APPROVAL_MESSAGE_LENGTH, NewNotification,
    NotificationKind, TimeEntry,
};
use crate::database::repositories::{Notifier, TimeEntryStore};
use crate::error::AppError;

/// Moves entries between `pending`, `approved` and `rejected`, one audited step at a time.
#[derive(Clone)]
pub struct ApprovalService {
    entries: Arc<dyn TimeEntryStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalService {
    pub fn new(entries: Arc<dyn TimeEntryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { entries, notifier }
    }

    pub async fn approve(
        &self,
        id: Uuid,
        message: Option<String>,
        approver: &ActingUser,
    ) -> Result<TimeEntry, AppError> {
        let message = clean_message(message)?;
        self.transition(id, EntryStatus::Approved, message, approver)
            .await
    }

    /// Rejections must say why.
    pub async fn reject(
        &self,
        id: Uuid,
        message: Option<String>,
        rejector: &ActingUser,
    ) -> Result<TimeEntry, AppError> {
        let message = clean_message(message)?.ok_or_else(|| {
            AppError::BadRequest("A message is required when rejecting a time entry".to_string())
        })?;
        self.transition(id, EntryStatus::Rejected, Some(message), rejector)
            .await
    }

    /// Approval trail of an entry, oldest first
    pub async fn history(
        &self,
        id: Uuid,
        acting: &ActingUser,
    ) -> Result<Vec<ApprovalHistory>, AppError> {
        let entry = self
            .entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;
        if !acting.can_access_user(entry.user_id) {
            return Err(AppError::Forbidden(
                "Cannot view other users' time entries".to_string(),
            ));
        }

        self.entries.approval_history(id).await
    }

    async fn transition(
        &self,
        id: Uuid,
        target: EntryStatus,
        message: Option<String>,
        actor: &ActingUser,
    ) -> Result<TimeEntry, AppError> {
        if !actor.is_manager_or_owner() {
            return Err(AppError::Forbidden(
                "Only managers and owners can approve or reject time entries".to_string(),
            ));
        }

        let entry = self
            .entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;

        if entry.status == target {
            return Err(AppError::Conflict(format!(
                "Time entry is already {}",
                target
            )));
        }

        let history = ApprovalHistory::new(
            entry.id,
            entry.status,
            target,
            message.clone(),
            actor.user_id,
        );
        let updated = self
            .entries
            .transition_status(entry.id, entry.version, target, &history)
            .await?;

        log::info!(
            "Time entry {} moved from {} to {} by {}",
            updated.id,
            history.previous_status,
            history.new_status,
            actor.user_id
        );

        let notification = decision_notification(&updated, message.as_deref());
        if let Err(err) = self.notifier.notify(&notification).await {
            log::warn!(
                "Failed to send {} notification for time entry {}: {}",
                notification.kind,
                updated.id,
                err
            );
        }

        Ok(updated)
    }
}

fn clean_message(message: Option<String>) -> Result<Option<String>, AppError> {
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    if let Some(text) = &message {
        if text.chars().count() > MAX_APPROVAL_MESSAGE_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Message must be at most {} characters",
                MAX_APPROVAL_MESSAGE_LENGTH
            )));
        }
    }

    Ok(message)
}

fn decision_notification(entry: &TimeEntry, message: Option<&str>) -> NewNotification {
    let (kind, verb) = match entry.status {
        EntryStatus::Rejected => (NotificationKind::Rejection, "rejected"),
        _ => (NotificationKind::Approval, "approved"),
    };

    let mut body = format!(
        "Your time entry for {} ({} hours) was {}",
        entry.date, entry.actual_hours, verb
    );
    if let Some(message) = message {
        body.push_str(": ");
        body.push_str(message);
    }

    NewNotification {
        user_id: entry.user_id,
        kind,
        related_entry_id: entry.id,
        title: format!("Time entry {}", verb),
        message: body,
    }
}
