use actix_web::web;

use crate::handlers::reports;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/users", web::get().to(reports::users_report))
            .route("/users/{id}", web::get().to(reports::user_report))
            .route(
                "/users/{id}/weekly/{week_start}",
                web::get().to(reports::user_weekly_report),
            )
            .route(
                "/users/{id}/monthly/{month}",
                web::get().to(reports::user_monthly_report),
            )
            .route("/teams", web::get().to(reports::teams_report))
            .route("/teams/{id}", web::get().to(reports::team_report))
            .route(
                "/teams/{id}/weekly/{week_start}",
                web::get().to(reports::team_weekly_report),
            )
            .route(
                "/departments",
                web::get().to(reports::departments_performance),
            )
            .route(
                "/departments/{id}",
                web::get().to(reports::department_performance),
            )
            .route("/projects", web::get().to(reports::projects_performance))
            .route("/projects/{id}", web::get().to(reports::project_performance))
            .route("/system", web::get().to(reports::system_overview)),
    );
}
