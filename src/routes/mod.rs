use actix_web::web;

use crate::handlers::{self, health};

pub mod reports;
pub mod time_entries;
pub mod validation;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .app_data(handlers::query_config())
        .app_data(handlers::path_config())
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health))
                .configure(time_entries::configure)
                .configure(validation::configure)
                .configure(reports::configure),
        );
}
