use actix_web::web;

use crate::handlers::validation;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/validation")
            .route(
                "/time-entry",
                web::post().to(validation::validate_time_entry),
            )
            .route(
                "/available-hours/{user_id}",
                web::get().to(validation::available_hours),
            ),
    );
}
