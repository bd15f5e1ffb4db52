pub mod aggregation;
pub mod approval;
pub mod calendar;
pub mod reports;
pub mod time_entry;
pub mod time_entry_queries;
pub mod validation;
pub mod week_lock;
pub mod weekly;

pub use approval::ApprovalService;
pub use reports::ReportService;
pub use time_entry::TimeEntryService;
pub use time_entry_queries::TimeEntryQueryService;
pub use validation::ValidationService;
pub use week_lock::WeekLocks;
pub use weekly::WeeklyService;
