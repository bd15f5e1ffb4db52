use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::auth::Claims;
use crate::database::models::{
    ApprovalDecisionInput, CreateTimeEntryInput, EntryStatus, Pagination, SortField, SortOrder,
    TimeEntryQuery, UpdateTimeEntryInput, WeeklyBulkInput, WeeklyUpdateInput, input_hours,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::calendar::parse_date;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Comma-separated statuses
    pub status: Option<String>,
    pub is_billable: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub is_billable: Option<bool>,
    pub search: Option<String>,
    /// Substring of the project details
    pub project: Option<String>,
    pub project_id: Option<Uuid>,
    pub min_hours: Option<BigDecimal>,
    pub max_hours: Option<BigDecimal>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

fn parse_statuses(value: Option<&str>) -> Result<Vec<EntryStatus>, AppError> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<EntryStatus>()
                .map_err(|_| AppError::BadRequest(format!("Invalid status: {}", s)))
        })
        .collect()
}

pub async fn list_time_entries(
    claims: Claims,
    state: Data<AppState>,
    params: Query<ListParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let query = TimeEntryQuery {
        user_id: params.user_id,
        start_date: params.start_date,
        end_date: params.end_date,
        statuses: parse_statuses(params.status.as_deref())?,
        is_billable: params.is_billable,
        search: params.search,
        sort_by: params.sort_by.unwrap_or_default(),
        sort_order: params.sort_order.unwrap_or_default(),
        pagination: Some(Pagination::new(params.page, params.limit)),
        ..Default::default()
    };

    let page = state.queries.list(query, &claims.acting_user()).await?;
    Ok(ApiResponse::success(page))
}

pub async fn create_time_entry(
    claims: Claims,
    state: Data<AppState>,
    input: Json<CreateTimeEntryInput>,
) -> Result<HttpResponse> {
    let entry = state
        .time_entries
        .create(input.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::created(entry))
}

pub async fn filter_time_entries(
    claims: Claims,
    state: Data<AppState>,
    params: Query<FilterParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let query = TimeEntryQuery {
        user_id: params.user_id,
        start_date: params.start_date,
        end_date: params.end_date,
        statuses: parse_statuses(params.status.as_deref())?,
        is_billable: params.is_billable,
        search: params.search,
        project: params.project,
        min_hours: hours_bound("minHours", params.min_hours)?,
        max_hours: hours_bound("maxHours", params.max_hours)?,
        sort_by: params.sort_by.unwrap_or_default(),
        sort_order: params.sort_order.unwrap_or_default(),
        ..Default::default()
    };

    let results = state
        .queries
        .filter(query, params.project_id, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(results))
}

fn hours_bound(name: &str, value: Option<BigDecimal>) -> Result<Option<BigDecimal>, AppError> {
    value
        .map(|value| {
            input_hours(&value)
                .ok_or_else(|| AppError::BadRequest(format!("{} is out of range", name)))
        })
        .transpose()
}

pub async fn search_time_entries(
    claims: Claims,
    state: Data<AppState>,
    params: Query<SearchParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let results = state
        .queries
        .search(
            params.q.as_deref().unwrap_or_default(),
            params.user_id,
            params.start_date,
            params.end_date,
            &claims.acting_user(),
        )
        .await?;
    Ok(ApiResponse::success(results))
}

pub async fn status_for_date(
    claims: Claims,
    state: Data<AppState>,
    path: Path<String>,
    params: Query<UserParams>,
) -> Result<HttpResponse> {
    let date = parse_date(&path)?;
    let status = state
        .queries
        .status_for_date(date, params.user_id, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(status))
}

pub async fn entries_by_date(
    claims: Claims,
    state: Data<AppState>,
    path: Path<String>,
    params: Query<UserParams>,
) -> Result<HttpResponse> {
    let date = parse_date(&path)?;
    let entries = state
        .queries
        .by_date(date, params.user_id, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(entries))
}

pub async fn entries_by_user(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<RangeParams>,
) -> Result<HttpResponse> {
    let entries = state
        .queries
        .by_user(
            path.into_inner(),
            params.start_date,
            params.end_date,
            &claims.acting_user(),
        )
        .await?;
    Ok(ApiResponse::success(entries))
}

pub async fn entries_by_project(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<RangeParams>,
) -> Result<HttpResponse> {
    let entries = state
        .queries
        .by_project(
            path.into_inner(),
            params.start_date,
            params.end_date,
            &claims.acting_user(),
        )
        .await?;
    Ok(ApiResponse::success(entries))
}

pub async fn entries_in_range(
    claims: Claims,
    state: Data<AppState>,
    params: Query<RangeParams>,
) -> Result<HttpResponse> {
    let (Some(start_date), Some(end_date)) = (params.start_date, params.end_date) else {
        return Err(
            AppError::BadRequest("startDate and endDate are required".to_string()).into(),
        );
    };

    let entries = state
        .queries
        .range(
            start_date,
            end_date,
            params.user_id,
            params.project_id,
            &claims.acting_user(),
        )
        .await?;
    Ok(ApiResponse::success(entries))
}

pub async fn create_weekly_bulk(
    claims: Claims,
    state: Data<AppState>,
    input: Json<WeeklyBulkInput>,
) -> Result<HttpResponse> {
    let result = state
        .weekly
        .create_weekly_bulk(input.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::created(result))
}

pub async fn get_weekly_view(
    claims: Claims,
    state: Data<AppState>,
    path: Path<String>,
    params: Query<UserParams>,
) -> Result<HttpResponse> {
    let week_start = parse_date(&path)?;
    let view = state
        .queries
        .weekly_view(week_start, params.user_id, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(view))
}

pub async fn update_weekly(
    claims: Claims,
    state: Data<AppState>,
    path: Path<String>,
    input: Json<WeeklyUpdateInput>,
) -> Result<HttpResponse> {
    let week_start = parse_date(&path)?;
    let result = state
        .weekly
        .update_weekly(week_start, input.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn get_time_entry(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let entry = state
        .time_entries
        .get(path.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(entry))
}

pub async fn update_time_entry(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Json<UpdateTimeEntryInput>,
) -> Result<HttpResponse> {
    let entry = state
        .time_entries
        .update(path.into_inner(), input.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(entry))
}

pub async fn delete_time_entry(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .time_entries
        .delete(path.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::message("Time entry deleted successfully"))
}

/// The decision body is optional when approving.
pub async fn approve_time_entry(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Option<Json<ApprovalDecisionInput>>,
) -> Result<HttpResponse> {
    let message = input.and_then(|body| body.into_inner().message);
    let entry = state
        .approvals
        .approve(path.into_inner(), message, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success_with_message(entry, "Time entry approved"))
}

pub async fn reject_time_entry(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    input: Option<Json<ApprovalDecisionInput>>,
) -> Result<HttpResponse> {
    let message = input.and_then(|body| body.into_inner().message);
    let entry = state
        .approvals
        .reject(path.into_inner(), message, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success_with_message(entry, "Time entry rejected"))
}

pub async fn approval_history(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let history = state
        .approvals
        .history(path.into_inner(), &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statuses_are_comma_separated() {
        let statuses = parse_statuses(Some("pending, Approved")).unwrap();

        assert_eq!(statuses, vec![EntryStatus::Pending, EntryStatus::Approved]);
        assert!(parse_statuses(None).unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_a_bad_request() {
        let result = parse_statuses(Some("pending,archived"));

        assert!(matches!(result, Err(AppError::BadRequest(message)) if message.contains("archived")));
    }
}
