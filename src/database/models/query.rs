use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::time_entry::{EntryStatus, TimeEntry};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `offset()` within `i64` for every accepted limit.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SortField {
        #[default]
        Date => "date",
        Hours => "hours",
        Status => "status",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum SortOrder {
        Asc => "asc",
        #[default]
        Desc => "desc",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamps to `1 <= page <= MAX_PAGE` and `1 <= limit <= 100`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter over stored entries. Empty fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct TimeEntryQuery {
    pub user_id: Option<Uuid>,
    pub user_ids: Option<Vec<Uuid>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub statuses: Vec<EntryStatus>,
    pub is_billable: Option<bool>,
    /// Case-insensitive substring of the task or the project details
    pub search: Option<String>,
    /// Case-insensitive substring of the project details
    pub project: Option<String>,
    pub min_hours: Option<BigDecimal>,
    pub max_hours: Option<BigDecimal>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// `None` returns every match
    pub pagination: Option<Pagination>,
}

impl TimeEntryQuery {
    pub fn for_user_between(user_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            user_id: Some(user_id),
            start_date: Some(start_date),
            end_date: Some(end_date),
            sort_order: SortOrder::Asc,
            ..Default::default()
        }
    }

    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            sort_order: SortOrder::Asc,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: (total + pagination.limit - 1) / pagination.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub average_hours_per_day: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResults {
    pub results: Vec<TimeEntry>,
    pub total_results: usize,
    pub summary: FilterSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<TimeEntry>,
    pub total_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusForDate {
    pub date: NaiveDate,
    pub has_entries: bool,
    pub total_actual_hours: BigDecimal,
    pub total_billable_hours: BigDecimal,
    pub entries_count: usize,
    pub statuses: Vec<EntryStatus>,
    pub entries: Vec<TimeEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(500)), Pagination { page: 1, limit: 100 });
        assert_eq!(Pagination::new(Some(3), Some(0)).offset(), 2);
    }

    #[test]
    fn huge_pages_keep_a_representable_offset() {
        let pagination = Pagination::new(Some(i64::MAX), Some(MAX_PAGE_SIZE));

        assert_eq!(pagination.page, MAX_PAGE);
        assert_eq!(pagination.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);
        assert!(Pagination::new(Some(i64::MAX), Some(1)).offset() > 0);
    }

    #[test]
    fn page_counts_partial_pages() {
        let page = Page::new(vec![1, 2], Pagination::new(Some(2), Some(5)), 7);

        assert_eq!(page.total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], Pagination::default(), 0).total_pages, 0);
    }
}
