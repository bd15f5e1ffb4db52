use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{Notifier, OrgDirectory, TimeEntryStore, UserDirectory};
use crate::database::models::{
    ApprovalHistory, Department, DirectoryCounts, EntryStatus, NewNotification, Page, Pagination,
    Project, SortField, SortOrder, Team, TimeEntry, TimeEntryQuery, UserProfile,
};
use crate::error::AppError;

/// Process-local implementation of every store, for tests and local runs.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<Uuid, TimeEntry>>,
    history: RwLock<Vec<ApprovalHistory>>,
    users: RwLock<HashMap<Uuid, UserProfile>>,
    teams: RwLock<HashMap<Uuid, Team>>,
    departments: RwLock<HashMap<Uuid, Department>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    products: AtomicI64,
    notifications: Mutex<Vec<NewNotification>>,
    notifications_offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: UserProfile) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn add_team(&self, team: Team) {
        self.teams.write().await.insert(team.id, team);
    }

    pub async fn add_department(&self, department: Department) {
        self.departments
            .write()
            .await
            .insert(department.id, department);
    }

    pub async fn add_project(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }

    pub fn set_product_count(&self, count: i64) {
        self.products.store(count, AtomicOrdering::SeqCst);
    }

    /// While offline every `notify` call fails.
    pub fn set_notifications_offline(&self, offline: bool) {
        self.notifications_offline
            .store(offline, AtomicOrdering::SeqCst);
    }

    pub async fn sent_notifications(&self) -> Vec<NewNotification> {
        self.notifications.lock().await.clone()
    }

    async fn hydrate(&self, mut entry: TimeEntry) -> TimeEntry {
        entry.user_name = self
            .users
            .read()
            .await
            .get(&entry.user_id)
            .map(|user| user.name.clone())
            .unwrap_or_default();
        entry
    }
}

fn matches(entry: &TimeEntry, query: &TimeEntryQuery) -> bool {
    if query.user_id.is_some_and(|user_id| entry.user_id != user_id) {
        return false;
    }
    if let Some(user_ids) = &query.user_ids {
        if !user_ids.contains(&entry.user_id) {
            return false;
        }
    }
    if query.start_date.is_some_and(|start| entry.date < start) {
        return false;
    }
    if query.end_date.is_some_and(|end| entry.date > end) {
        return false;
    }
    if !query.statuses.is_empty() && !query.statuses.contains(&entry.status) {
        return false;
    }
    if query
        .is_billable
        .is_some_and(|is_billable| entry.is_billable != is_billable)
    {
        return false;
    }

    let blob = entry.project_details.to_blob().to_lowercase();
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let term = search.trim().to_lowercase();
        if !entry.task.to_lowercase().contains(&term) && !blob.contains(&term) {
            return false;
        }
    }
    if let Some(project) = query.project.as_deref().filter(|s| !s.trim().is_empty()) {
        if !blob.contains(&project.trim().to_lowercase()) {
            return false;
        }
    }
    if let Some(min_hours) = &query.min_hours {
        if entry.actual_hours < *min_hours {
            return false;
        }
    }
    if let Some(max_hours) = &query.max_hours {
        if entry.actual_hours > *max_hours {
            return false;
        }
    }

    true
}

fn compare(a: &TimeEntry, b: &TimeEntry, sort_by: SortField) -> Ordering {
    let primary = match sort_by {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Hours => a.actual_hours.cmp(&b.actual_hours),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    };

    primary
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn stale_write(id: Uuid) -> AppError {
    AppError::Conflict(format!(
        "Time entry {} was modified by another request",
        id
    ))
}

#[async_trait]
impl TimeEntryStore for InMemoryStore {
    async fn insert(&self, entry: &TimeEntry) -> Result<TimeEntry, AppError> {
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(self.hydrate(entry.clone()).await)
    }

    async fn insert_many(&self, entries: &[TimeEntry]) -> Result<usize, AppError> {
        let mut stored = self.entries.write().await;
        for entry in entries {
            stored.insert(entry.id, entry.clone());
        }
        Ok(entries.len())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeEntry>, AppError> {
        let entry = self.entries.read().await.get(&id).cloned();
        match entry {
            Some(entry) => Ok(Some(self.hydrate(entry).await)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        entry: &TimeEntry,
        expected_version: i32,
    ) -> Result<TimeEntry, AppError> {
        let updated = {
            let mut stored = self.entries.write().await;
            let current = stored
                .get_mut(&entry.id)
                .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;
            if current.version != expected_version {
                return Err(stale_write(entry.id));
            }

            current.date = entry.date;
            current.actual_hours = entry.actual_hours.clone();
            current.billable_hours = entry.billable_hours.clone();
            current.total_hours = entry.total_hours.clone();
            current.task = entry.task.clone();
            current.project_details = entry.project_details.clone();
            current.is_billable = entry.is_billable;
            current.version += 1;
            current.updated_at = Utc::now();
            current.clone()
        };

        Ok(self.hydrate(updated).await)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let removed = self.entries.write().await.remove(&id).is_some();
        if removed {
            self.history.write().await.retain(|row| row.entry_id != id);
        }
        Ok(removed)
    }

    async fn query(&self, query: &TimeEntryQuery) -> Result<Page<TimeEntry>, AppError> {
        let mut found: Vec<TimeEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| matches(entry, query))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = found.len() as i64;
        let (pagination, selected) = match query.pagination {
            Some(pagination) => {
                let page: Vec<TimeEntry> = found
                    .into_iter()
                    .skip(pagination.offset() as usize)
                    .take(pagination.limit as usize)
                    .collect();
                (pagination, page)
            }
            None => (
                Pagination {
                    page: 1,
                    limit: total.max(1),
                },
                found,
            ),
        };

        let mut items = Vec::with_capacity(selected.len());
        for entry in selected {
            items.push(self.hydrate(entry).await);
        }

        Ok(Page::new(items, pagination, total))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected_version: i32,
        new_status: EntryStatus,
        history: &ApprovalHistory,
    ) -> Result<TimeEntry, AppError> {
        let updated = {
            let mut stored = self.entries.write().await;
            let current = stored
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;
            if current.version != expected_version {
                return Err(stale_write(id));
            }

            current.status = new_status;
            current.version += 1;
            current.updated_at = history.created_at;
            self.history.write().await.push(history.clone());
            current.clone()
        };

        Ok(self.hydrate(updated).await)
    }

    async fn approval_history(&self, entry_id: Uuid) -> Result<Vec<ApprovalHistory>, AppError> {
        Ok(self
            .history
            .read()
            .await
            .iter()
            .filter(|row| row.entry_id == entry_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        let mut users: Vec<UserProfile> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}

#[async_trait]
impl OrgDirectory for InMemoryStore {
    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, AppError> {
        Ok(self.teams.read().await.get(&id).cloned())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, AppError> {
        let mut teams: Vec<Team> = self.teams.read().await.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn find_department(&self, id: Uuid) -> Result<Option<Department>, AppError> {
        Ok(self.departments.read().await.get(&id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let mut departments: Vec<Department> =
            self.departments.read().await.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self.projects.read().await.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn counts(&self) -> Result<DirectoryCounts, AppError> {
        Ok(DirectoryCounts {
            users: self.users.read().await.len() as i64,
            teams: self.teams.read().await.len() as i64,
            departments: self.departments.read().await.len() as i64,
            projects: self.projects.read().await.len() as i64,
            products: self.products.load(AtomicOrdering::SeqCst),
        })
    }
}

#[async_trait]
impl Notifier for InMemoryStore {
    async fn notify(&self, notification: &NewNotification) -> Result<(), AppError> {
        if self.notifications_offline.load(AtomicOrdering::SeqCst) {
            return Err(AppError::internal_server_error_message(
                "Notification service unavailable",
            ));
        }
        self.notifications.lock().await.push(notification.clone());
        Ok(())
    }
}
