use actix_web::{
    HttpResponse, Result,
    web::{Data, Path, Query},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::auth::Claims;
use crate::database::models::ProjectStatus;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::calendar::parse_date;
use crate::services::reports::report_period;

/// Report range; defaults to the current month.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReportParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
}

pub async fn users_report(
    claims: Claims,
    state: Data<AppState>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let reports = state
        .reports
        .all_users_report(period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(reports))
}

pub async fn user_report(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let report = state
        .reports
        .user_report(path.into_inner(), period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(report))
}

pub async fn user_weekly_report(
    claims: Claims,
    state: Data<AppState>,
    path: Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (user_id, week_start) = path.into_inner();
    let week_start = parse_date(&week_start)?;
    let report = state
        .reports
        .user_weekly_report(user_id, week_start, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(report))
}

pub async fn user_monthly_report(
    claims: Claims,
    state: Data<AppState>,
    path: Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (user_id, month) = path.into_inner();
    let report = state
        .reports
        .user_monthly_report(user_id, &month, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(report))
}

pub async fn teams_report(
    claims: Claims,
    state: Data<AppState>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let reports = state
        .reports
        .teams_report(period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(reports))
}

pub async fn team_report(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let report = state
        .reports
        .team_report(path.into_inner(), period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(report))
}

pub async fn team_weekly_report(
    claims: Claims,
    state: Data<AppState>,
    path: Path<(Uuid, String)>,
) -> Result<HttpResponse> {
    let (team_id, week_start) = path.into_inner();
    let week_start = parse_date(&week_start)?;
    let report = state
        .reports
        .team_weekly_report(team_id, week_start, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(report))
}

pub async fn departments_performance(
    claims: Claims,
    state: Data<AppState>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let performances = state
        .reports
        .department_performance(None, period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(performances))
}

pub async fn department_performance(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let performance = state
        .reports
        .department_performance(Some(path.into_inner()), period, &claims.acting_user())
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))?;
    Ok(ApiResponse::success(performance))
}

pub async fn projects_performance(
    claims: Claims,
    state: Data<AppState>,
    params: Query<ProjectReportParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let performances = state
        .reports
        .project_performance(None, params.status, period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(performances))
}

pub async fn project_performance(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let performance = state
        .reports
        .project_performance(Some(path.into_inner()), None, period, &claims.acting_user())
        .await?
        .pop()
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(ApiResponse::success(performance))
}

pub async fn system_overview(
    claims: Claims,
    state: Data<AppState>,
    params: Query<PeriodParams>,
) -> Result<HttpResponse> {
    let period = report_period(params.start_date, params.end_date)?;
    let overview = state
        .reports
        .system_overview(period, &claims.acting_user())
        .await?;
    Ok(ApiResponse::success(overview))
}
