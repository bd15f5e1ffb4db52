use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::auth::Claims;
use crate::database::models::ValidateTimeEntryInput;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::calendar::parse_date;

#[derive(Debug, Deserialize)]
pub struct AvailableHoursParams {
    pub date: Option<String>,
}

/// Evaluates the rules without writing anything. A failed rule is still a 200.
pub async fn validate_time_entry(
    claims: Claims,
    state: Data<AppState>,
    input: Json<ValidateTimeEntryInput>,
) -> Result<HttpResponse> {
    let acting = claims.acting_user();
    let input = input.into_inner();
    let user_id = input.user_id.unwrap_or(acting.user_id);

    if !acting.can_access_user(user_id) {
        return Err(AppError::Forbidden(
            "Cannot validate time entries for other users".to_string(),
        )
        .into());
    }

    let result = state
        .validation
        .validate_time_entry(user_id, &input, None)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn available_hours(
    claims: Claims,
    state: Data<AppState>,
    path: Path<Uuid>,
    params: Query<AvailableHoursParams>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if !claims.acting_user().can_access_user(user_id) {
        return Err(AppError::Forbidden(
            "Cannot view available hours of other users".to_string(),
        )
        .into());
    }

    let date = match params.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => Utc::now().date_naive(),
    };

    let hours = state.validation.available_hours(user_id, date).await?;
    Ok(ApiResponse::success(hours))
}
