use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::TimeEntryStore;
use crate::database::{
    models::{
        ApprovalHistory, EntryStatus, Page, Pagination, SortField, SortOrder, TimeEntry,
        TimeEntryQuery,
    },
    types::TimeEntryRow,
    utils::{like_pattern, sql},
};
use crate::error::AppError;

const ENTRY_COLUMNS: &str = r#"
    te.id,
    te.user_id,
    COALESCE(u.name, '') AS user_name,
    te.date,
    te.actual_hours,
    te.billable_hours,
    te.total_hours,
    te.available_hours,
    te.task,
    te.project_details,
    te.is_billable,
    te.status,
    te.version,
    te.created_at,
    te.updated_at
"#;

#[derive(Clone)]
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar(&sql("SELECT EXISTS (SELECT 1 FROM time_entries WHERE id = ?)"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// `Conflict` if the entry is still there, `NotFound` if it is gone
    async fn stale_write_error(&self, id: Uuid) -> AppError {
        match self.exists(id).await {
            Ok(true) => AppError::Conflict(format!(
                "Time entry {} was modified by another request",
                id
            )),
            Ok(false) => AppError::NotFound("Time entry not found".to_string()),
            Err(err) => err,
        }
    }
}

/// Appends the WHERE clause shared by the page and count queries.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TimeEntryQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(user_id) = query.user_id {
        builder.push(" AND te.user_id = ").push_bind(user_id);
    }
    if let Some(user_ids) = &query.user_ids {
        builder
            .push(" AND te.user_id = ANY(")
            .push_bind(user_ids.clone())
            .push(")");
    }
    if let Some(start_date) = query.start_date {
        builder.push(" AND te.date >= ").push_bind(start_date);
    }
    if let Some(end_date) = query.end_date {
        builder.push(" AND te.date <= ").push_bind(end_date);
    }
    if !query.statuses.is_empty() {
        let statuses: Vec<String> = query.statuses.iter().map(|s| s.to_string()).collect();
        builder
            .push(" AND te.status = ANY(")
            .push_bind(statuses)
            .push(")");
    }
    if let Some(is_billable) = query.is_billable {
        builder.push(" AND te.is_billable = ").push_bind(is_billable);
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        builder
            .push(" AND (te.task ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR te.project_details ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(project) = query.project.as_deref().filter(|s| !s.trim().is_empty()) {
        builder
            .push(" AND te.project_details ILIKE ")
            .push_bind(like_pattern(project));
    }
    if let Some(min_hours) = &query.min_hours {
        builder
            .push(" AND te.actual_hours >= ")
            .push_bind(min_hours.clone());
    }
    if let Some(max_hours) = &query.max_hours {
        builder
            .push(" AND te.actual_hours <= ")
            .push_bind(max_hours.clone());
    }
}

fn order_clause(sort_by: SortField, sort_order: SortOrder) -> String {
    let column = match sort_by {
        SortField::Date => "te.date",
        SortField::Hours => "te.actual_hours",
        SortField::Status => "te.status",
    };
    let direction = match sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    format!(
        " ORDER BY {column} {direction}, te.created_at {direction}, te.id {direction}"
    )
}

#[async_trait]
impl TimeEntryStore for TimeEntryRepository {
    /// Create a new time entry
    async fn insert(&self, entry: &TimeEntry) -> Result<TimeEntry, AppError> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql(&format!(
            r#"
            WITH inserted AS (
                INSERT INTO
                    time_entries (
                        id,
                        user_id,
                        date,
                        actual_hours,
                        billable_hours,
                        total_hours,
                        available_hours,
                        task,
                        project_details,
                        is_billable,
                        status,
                        version,
                        created_at,
                        updated_at
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING
                    *
            )
            SELECT
                {ENTRY_COLUMNS}
            FROM
                inserted te
                LEFT JOIN users u ON u.id = te.user_id
            "#
        )))
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.date)
        .bind(&entry.actual_hours)
        .bind(&entry.billable_hours)
        .bind(&entry.total_hours)
        .bind(&entry.available_hours)
        .bind(&entry.task)
        .bind(entry.project_details.to_blob())
        .bind(entry.is_billable)
        .bind(entry.status)
        .bind(entry.version)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Create a batch of time entries in one transaction
    async fn insert_many(&self, entries: &[TimeEntry]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(&sql(r#"
                INSERT INTO
                    time_entries (
                        id,
                        user_id,
                        date,
                        actual_hours,
                        billable_hours,
                        total_hours,
                        available_hours,
                        task,
                        project_details,
                        is_billable,
                        status,
                        version,
                        created_at,
                        updated_at
                    )
                VALUES
                    (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#))
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(entry.date)
            .bind(&entry.actual_hours)
            .bind(&entry.billable_hours)
            .bind(&entry.total_hours)
            .bind(&entry.available_hours)
            .bind(&entry.task)
            .bind(entry.project_details.to_blob())
            .bind(entry.is_billable)
            .bind(entry.status)
            .bind(entry.version)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(entries.len())
    }

    /// Get a time entry by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TimeEntry>, AppError> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql(&format!(
            r#"
            SELECT
                {ENTRY_COLUMNS}
            FROM
                time_entries te
                LEFT JOIN users u ON u.id = te.user_id
            WHERE
                te.id = ?
            "#
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TimeEntry::from))
    }

    /// Update the mutable fields of a time entry
    async fn update(
        &self,
        entry: &TimeEntry,
        expected_version: i32,
    ) -> Result<TimeEntry, AppError> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&sql(&format!(
            r#"
            WITH updated AS (
                UPDATE
                    time_entries
                SET
                    date = ?,
                    actual_hours = ?,
                    billable_hours = ?,
                    total_hours = ?,
                    task = ?,
                    project_details = ?,
                    is_billable = ?,
                    version = version + 1,
                    updated_at = ?
                WHERE
                    id = ?
                    AND version = ?
                RETURNING
                    *
            )
            SELECT
                {ENTRY_COLUMNS}
            FROM
                updated te
                LEFT JOIN users u ON u.id = te.user_id
            "#
        )))
        .bind(entry.date)
        .bind(&entry.actual_hours)
        .bind(&entry.billable_hours)
        .bind(&entry.total_hours)
        .bind(&entry.task)
        .bind(entry.project_details.to_blob())
        .bind(entry.is_billable)
        .bind(Utc::now())
        .bind(entry.id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(self.stale_write_error(entry.id).await),
        }
    }

    /// Delete a time entry and its approval history
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(&sql("DELETE FROM time_entries WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get time entries matching a filter
    async fn query(&self, query: &TimeEntryQuery) -> Result<Page<TimeEntry>, AppError> {
        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM time_entries te LEFT JOIN users u ON u.id = te.user_id"
        ));
        push_filters(&mut select, query);
        select.push(order_clause(query.sort_by, query.sort_order));

        if let Some(pagination) = query.pagination {
            select
                .push(" LIMIT ")
                .push_bind(pagination.limit)
                .push(" OFFSET ")
                .push_bind(pagination.offset());
        }

        let rows = select
            .build_query_as::<TimeEntryRow>()
            .fetch_all(&self.pool)
            .await?;
        let items: Vec<TimeEntry> = rows.into_iter().map(TimeEntry::from).collect();

        let (pagination, total) = match query.pagination {
            Some(pagination) => {
                let mut count = QueryBuilder::<Postgres>::new(
                    "SELECT COUNT(*) FROM time_entries te",
                );
                push_filters(&mut count, query);
                let total = count
                    .build_query_scalar::<i64>()
                    .fetch_one(&self.pool)
                    .await?;
                (pagination, total)
            }
            None => {
                let total = items.len() as i64;
                (
                    Pagination {
                        page: 1,
                        limit: total.max(1),
                    },
                    total,
                )
            }
        };

        Ok(Page::new(items, pagination, total))
    }

    /// Set the status of a time entry and record the transition
    async fn transition_status(
        &self,
        id: Uuid,
        expected_version: i32,
        new_status: EntryStatus,
        history: &ApprovalHistory,
    ) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(&sql(r#"
            UPDATE
                time_entries
            SET
                status = ?,
                version = version + 1,
                updated_at = ?
            WHERE
                id = ?
                AND version = ?
        "#))
        .bind(new_status)
        .bind(history.created_at)
        .bind(id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.stale_write_error(id).await);
        }

        sqlx::query(&sql(r#"
            INSERT INTO
                approval_history (
                    id,
                    entry_id,
                    previous_status,
                    new_status,
                    message,
                    approved_by,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?)
        "#))
        .bind(history.id)
        .bind(history.entry_id)
        .bind(history.previous_status)
        .bind(history.new_status)
        .bind(&history.message)
        .bind(history.approved_by)
        .bind(history.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))
    }

    /// Get the approval trail of a time entry, oldest first
    async fn approval_history(&self, entry_id: Uuid) -> Result<Vec<ApprovalHistory>, AppError> {
        let history = sqlx::query_as::<_, ApprovalHistory>(&sql(r#"
            SELECT
                id,
                entry_id,
                previous_status,
                new_status,
                message,
                approved_by,
                created_at
            FROM
                approval_history
            WHERE
                entry_id = ?
            ORDER BY
                created_at ASC,
                id ASC
        "#))
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }
}
