use std::sync::Arc;

use sqlx::PgPool;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;
use database::repositories::{
    InMemoryStore, Notifier, OrgDirectory, PgDirectoryRepository, PgNotificationRepository,
    TimeEntryRepository, TimeEntryStore, UserDirectory,
};
use services::{
    ApprovalService, ReportService, TimeEntryQueryService, TimeEntryService, ValidationService,
    WeekLocks, WeeklyService,
};

/// The collaborators every service is built from.
#[derive(Clone)]
pub struct Stores {
    pub entries: Arc<dyn TimeEntryStore>,
    pub users: Arc<dyn UserDirectory>,
    pub org: Arc<dyn OrgDirectory>,
    pub notifier: Arc<dyn Notifier>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let directory = Arc::new(PgDirectoryRepository::new(pool.clone()));
        Self {
            entries: Arc::new(TimeEntryRepository::new(pool.clone())),
            users: directory.clone(),
            org: directory,
            notifier: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            entries: store.clone(),
            users: store.clone(),
            org: store.clone(),
            notifier: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub time_entries: TimeEntryService,
    pub approvals: ApprovalService,
    pub weekly: WeeklyService,
    pub validation: ValidationService,
    pub queries: TimeEntryQueryService,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(stores: Stores, config: &Config) -> Self {
        let validation = ValidationService::new(stores.entries.clone(), stores.users.clone());

        Self {
            time_entries: TimeEntryService::new(
                stores.entries.clone(),
                stores.users.clone(),
                validation.clone(),
                WeekLocks::new(),
                config.enforce_validation_on_write,
            ),
            approvals: ApprovalService::new(stores.entries.clone(), stores.notifier),
            weekly: WeeklyService::new(stores.entries.clone(), stores.users.clone()),
            queries: TimeEntryQueryService::new(stores.entries.clone(), stores.org.clone()),
            reports: ReportService::new(stores.entries, stores.users, stores.org),
            validation,
        }
    }
}
