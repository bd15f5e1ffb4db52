use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;

use timesheet::database::models::{EntryStatus, TimeEntry, ValidationResult};

mod common;

use common::{TestAssertions, TestContext, auth_header, date, dec};

#[actix_web::test]
#[serial]
async fn test_create_time_entry_success() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-04",
            "actualHours": "7.5",
            "billableHours": 6,
            "task": "Implement login page",
            "projectDetails": { "category": "project", "name": "Apollo" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = test::read_body(resp).await;
    let entry: TimeEntry = TestAssertions::assert_success_response(&body);
    assert_eq!(entry.user_id, ctx.employee.id);
    assert_eq!(entry.user_name, ctx.employee.name);
    assert_eq!(entry.status, EntryStatus::Pending);
    assert_eq!(entry.version, 1);
    assert_eq!(entry.total_hours, dec("7.5"));
    assert_eq!(entry.available_hours, dec("8"));
    assert_eq!(entry.project_details.name, "Apollo");
    assert!(entry.is_billable);
}

#[actix_web::test]
#[serial]
async fn test_create_time_entry_unauthorized() {
    // Arrange
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .set_json(json!({
            "date": "2024-03-04",
            "actualHours": 8,
            "billableHours": 8,
            "task": "Work"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn test_create_time_entry_over_daily_cap_is_rejected() {
    // Arrange
    let ctx = TestContext::new().await;
    ctx.seed_entry(&ctx.employee, date("2024-03-04"), 20).await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-04",
            "actualHours": 5,
            "billableHours": 0,
            "task": "Late fix"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = test::read_body(resp).await;
    let response: timesheet::handlers::shared::ApiResponse<ValidationResult> =
        serde_json::from_slice(&body).unwrap();
    let result = response.data.unwrap();
    assert!(!result.is_valid);
    assert!(!result.validation_rules.no_overlap);
    assert!(result.errors[0].starts_with("Daily hours limit exceeded"));
}

#[actix_web::test]
#[serial]
async fn test_create_time_entry_billable_over_actual_is_rejected() {
    // Arrange
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-04",
            "actualHours": 4,
            "billableHours": 5,
            "task": "Consulting"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(ctx.store.sent_notifications().await.is_empty());
}

#[actix_web::test]
#[serial]
async fn test_create_without_validation_still_enforces_bounds() {
    // Arrange
    let mut config = timesheet::Config::test_config();
    config.enforce_validation_on_write = false;
    let ctx = TestContext::with_config(config).await;
    ctx.seed_entry(&ctx.employee, date("2024-03-04"), 20).await;
    let app = test_app!(ctx);

    // Act
    let over_cap = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-04",
            "actualHours": 6,
            "billableHours": 0,
            "task": "Overtime"
        }))
        .to_request();
    let over_cap_resp = test::call_service(&app, over_cap).await;

    let out_of_bounds = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-05",
            "actualHours": 25,
            "billableHours": 0,
            "task": "Impossible day"
        }))
        .to_request();
    let out_of_bounds_resp = test::call_service(&app, out_of_bounds).await;

    // Assert
    assert_eq!(over_cap_resp.status(), StatusCode::CREATED);
    assert_eq!(out_of_bounds_resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn test_create_time_entry_with_malformed_body() {
    // Arrange
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "03/04/2024",
            "actualHours": 8,
            "billableHours": 8,
            "task": "Work"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    let message = TestAssertions::assert_error_response(&body);
    assert!(message.contains("Invalid request body"));
}

#[actix_web::test]
#[serial]
async fn test_employee_cannot_read_other_users_entry() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx
        .seed_entry(&ctx.other_employee, date("2024-03-04"), 8)
        .await;
    let app = test_app!(ctx);

    // Act
    let as_employee = test::TestRequest::get()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let employee_resp = test::call_service(&app, as_employee).await;

    let as_manager = test::TestRequest::get()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.manager_token()))
        .to_request();
    let manager_resp = test::call_service(&app, as_manager).await;

    // Assert
    assert_eq!(employee_resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(manager_resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn test_get_missing_entry_is_not_found() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/time-entries/{}", uuid::Uuid::new_v4()))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn test_update_time_entry_bumps_version() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 6).await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "actualHours": 7, "version": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let updated: TimeEntry = TestAssertions::assert_success_response(&body);
    assert_eq!(updated.actual_hours, dec("7"));
    assert_eq!(updated.total_hours, dec("7"));
    assert_eq!(updated.version, 2);
}

#[actix_web::test]
#[serial]
async fn test_update_with_stale_version_conflicts() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 6).await;
    let app = test_app!(ctx);

    let first = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "task": "Renamed", "version": 1 }))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

    // Act
    let stale = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "task": "Renamed again", "version": 1 }))
        .to_request();
    let resp = test::call_service(&app, stale).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
#[serial]
async fn test_approved_entry_cannot_be_edited_or_deleted_by_employee() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 8).await;
    let app = test_app!(ctx);

    let approve = test::TestRequest::post()
        .uri(&format!("/api/v1/time-entries/{}/approve", entry.id))
        .insert_header(auth_header(&ctx.manager_token()))
        .to_request();
    assert_eq!(test::call_service(&app, approve).await.status(), StatusCode::OK);

    // Act
    let edit = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "task": "Too late" }))
        .to_request();
    let edit_resp = test::call_service(&app, edit).await;

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let delete_resp = test::call_service(&app, delete).await;

    let manager_delete = test::TestRequest::delete()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.manager_token()))
        .to_request();
    let manager_delete_resp = test::call_service(&app, manager_delete).await;

    // Assert
    assert_eq!(edit_resp.status(), StatusCode::CONFLICT);
    assert_eq!(delete_resp.status(), StatusCode::CONFLICT);
    assert_eq!(manager_delete_resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn test_delete_own_pending_entry() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 8).await;
    let app = test_app!(ctx);

    // Act
    let delete = test::TestRequest::delete()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let delete_resp = test::call_service(&app, delete).await;

    let read = test::TestRequest::get()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let read_resp = test::call_service(&app, read).await;

    // Assert
    assert_eq!(delete_resp.status(), StatusCode::OK);
    assert_eq!(read_resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn test_invalid_entry_id_is_a_bad_request() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/v1/time-entries/not-a-uuid")
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
#[serial]
async fn test_employee_cannot_edit_or_delete_other_users_entry() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.other_employee, date("2024-03-04"), 6).await;
    let app = test_app!(ctx);

    // Act
    let edit = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "actualHours": 7 }))
        .to_request();
    let edit_resp = test::call_service(&app, edit).await;

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .to_request();
    let delete_resp = test::call_service(&app, delete).await;

    let read = test::TestRequest::get()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.manager_token()))
        .to_request();
    let read_resp = test::call_service(&app, read).await;

    // Assert
    assert_eq!(edit_resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(delete_resp.status(), StatusCode::FORBIDDEN);
    let body = test::read_body(read_resp).await;
    let unchanged: TimeEntry = TestAssertions::assert_success_response(&body);
    assert_eq!(unchanged.actual_hours, dec("6"));
    assert_eq!(unchanged.version, 1);
}

#[actix_web::test]
#[serial]
async fn test_manager_can_edit_an_employees_pending_entry() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 6).await;
    let app = test_app!(ctx);

    // Act
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.manager_token()))
        .set_json(json!({ "actualHours": "5.5", "billableHours": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let updated: TimeEntry = TestAssertions::assert_success_response(&body);
    assert_eq!(updated.user_id, ctx.employee.id);
    assert_eq!(updated.actual_hours, dec("5.5"));
    assert_eq!(updated.billable_hours, dec("5"));
}

#[actix_web::test]
#[serial]
async fn test_update_validates_against_the_other_entries_of_the_day() {
    // Arrange
    let ctx = TestContext::new().await;
    let long_day = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 20).await;
    let short_task = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 2).await;
    let app = test_app!(ctx);

    // Act
    let grow_own = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", long_day.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "actualHours": 22 }))
        .to_request();
    let grow_own_resp = test::call_service(&app, grow_own).await;

    let past_cap = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", short_task.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "actualHours": 3 }))
        .to_request();
    let past_cap_resp = test::call_service(&app, past_cap).await;

    // Assert
    assert_eq!(grow_own_resp.status(), StatusCode::OK);
    assert_eq!(past_cap_resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = test::read_body(past_cap_resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
}

#[actix_web::test]
#[serial]
async fn test_absurd_hours_are_rejected_quickly() {
    // Arrange
    let ctx = TestContext::new().await;
    let entry = ctx.seed_entry(&ctx.employee, date("2024-03-04"), 6).await;
    let app = test_app!(ctx);

    // Act
    let create = test::TestRequest::post()
        .uri("/api/v1/time-entries")
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({
            "date": "2024-03-05",
            "actualHours": "1e3000000",
            "billableHours": 0,
            "task": "Endless"
        }))
        .to_request();
    let create_resp = test::call_service(&app, create).await;

    let update = test::TestRequest::put()
        .uri(&format!("/api/v1/time-entries/{}", entry.id))
        .insert_header(auth_header(&ctx.employee_token()))
        .set_json(json!({ "billableHours": "-1e3000000" }))
        .to_request();
    let update_resp = test::call_service(&app, update).await;

    // Assert
    assert_eq!(create_resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(update_resp.status(), StatusCode::BAD_REQUEST);
}
