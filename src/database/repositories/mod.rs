use async_trait::async_trait;
use uuid::Uuid;

use crate::database::models::{
    ApprovalHistory, Department, DirectoryCounts, EntryStatus, NewNotification, Page, Project,
    Team, TimeEntry, TimeEntryQuery, UserProfile,
};
use crate::error::AppError;

pub mod directory;
pub mod memory;
pub mod notification;
pub mod time_entry;

pub use directory::PgDirectoryRepository;
pub use memory::InMemoryStore;
pub use notification::PgNotificationRepository;
pub use time_entry::TimeEntryRepository;

/// Persistence of time entries and their approval trail.
#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    async fn insert(&self, entry: &TimeEntry) -> Result<TimeEntry, AppError>;

    /// Inserts every entry or none of them.
    async fn insert_many(&self, entries: &[TimeEntry]) -> Result<usize, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeEntry>, AppError>;

    /// Writes `entry` if the stored version still equals `expected_version`,
    /// bumping the version. `Conflict` otherwise.
    async fn update(&self, entry: &TimeEntry, expected_version: i32)
    -> Result<TimeEntry, AppError>;

    /// Hard delete, cascading to the approval trail.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Every match when the query carries no pagination.
    async fn query(&self, query: &TimeEntryQuery) -> Result<Page<TimeEntry>, AppError>;

    /// Sets the status and appends the history row in one unit, guarded by version.
    async fn transition_status(
        &self,
        id: Uuid,
        expected_version: i32,
        new_status: EntryStatus,
        history: &ApprovalHistory,
    ) -> Result<TimeEntry, AppError>;

    async fn approval_history(&self, entry_id: Uuid) -> Result<Vec<ApprovalHistory>, AppError>;
}

/// Read-only lookups against the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, AppError>;

    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError>;
}

/// Read-only lookups against teams, departments and projects.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, AppError>;

    async fn list_teams(&self) -> Result<Vec<Team>, AppError>;

    async fn find_department(&self, id: Uuid) -> Result<Option<Department>, AppError>;

    async fn list_departments(&self) -> Result<Vec<Department>, AppError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError>;

    async fn list_projects(&self) -> Result<Vec<Project>, AppError>;

    async fn counts(&self) -> Result<DirectoryCounts, AppError>;
}

/// Outbound notices. Callers treat failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &NewNotification) -> Result<(), AppError>;
}
