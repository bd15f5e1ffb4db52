#![allow(dead_code)]

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use uuid::Uuid;

use timesheet::auth::Claims;
use timesheet::config::Config;
use timesheet::database::models::{
    EntryDraft, ProjectDetails, TimeEntry, UserProfile, UserRole, hours,
};
use timesheet::database::repositories::{InMemoryStore, TimeEntryStore};
use timesheet::handlers::shared::ApiResponse;
use timesheet::{AppState, Stores};

/// Builds the full API over the context's in-memory store.
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.config.clone()))
                .app_data(actix_web::web::Data::new($ctx.state()))
                .configure(timesheet::routes::configure),
        )
        .await
    };
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub config: Config,
    pub employee: UserProfile,
    pub other_employee: UserProfile,
    pub manager: UserProfile,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(Config::test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let store = Arc::new(InMemoryStore::new());

        let employee = MockData::user(UserRole::Employee);
        let other_employee = MockData::user(UserRole::Employee);
        let manager = MockData::user(UserRole::Manager);
        for user in [&employee, &other_employee, &manager] {
            store.add_user(user.clone()).await;
        }

        TestContext {
            store,
            config,
            employee,
            other_employee,
            manager,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(Stores::in_memory(self.store.clone()), &self.config)
    }

    pub fn token_for(&self, user: &UserProfile) -> String {
        Claims::issue(user.id, user.role, &self.config).expect("Failed to sign test token")
    }

    pub fn employee_token(&self) -> String {
        self.token_for(&self.employee)
    }

    pub fn manager_token(&self) -> String {
        self.token_for(&self.manager)
    }

    /// Stores an entry directly, bypassing the services
    pub async fn seed_entry(&self, owner: &UserProfile, date: NaiveDate, actual: i64) -> TimeEntry {
        self.seed_entry_with(owner, date, actual, actual, "")
            .await
    }

    pub async fn seed_entry_with(
        &self,
        owner: &UserProfile,
        date: NaiveDate,
        actual: i64,
        billable: i64,
        project: &str,
    ) -> TimeEntry {
        let entry = TimeEntry::new(
            owner,
            EntryDraft {
                date,
                actual_hours: hours(actual),
                billable_hours: hours(billable),
                task: "Seeded work".to_string(),
                project_details: ProjectDetails {
                    category: "project".to_string(),
                    name: project.to_string(),
                    ..Default::default()
                },
                is_billable: billable > 0,
            },
        );
        self.store
            .insert(&entry)
            .await
            .expect("Failed to seed time entry")
    }
}

// Mock data generators
pub struct MockData;

impl MockData {
    pub fn user(role: UserRole) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: Name().fake(),
            email: SafeEmail().fake(),
            role,
            available_hours: hours(8),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("Invalid test date")
}

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("Invalid test decimal")
}

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

// Test assertion helpers
pub struct TestAssertions;

impl TestAssertions {
    pub fn assert_success_response<T>(body: &[u8]) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        let response: ApiResponse<T> =
            serde_json::from_slice(body).expect("Failed to parse JSON response");

        assert!(
            response.success,
            "Expected successful response but got error: {:?}",
            response.message
        );
        response.data.expect("Expected data in successful response")
    }

    /// Returns the error message of a failed envelope
    pub fn assert_error_response(body: &[u8]) -> String {
        let response: ApiResponse<serde_json::Value> =
            serde_json::from_slice(body).expect("Failed to parse JSON response");

        assert!(!response.success, "Expected an error response");
        response.message.expect("Expected a message in error response")
    }
}

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}
