use actix_web::web;

use crate::handlers::time_entries;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/time-entries")
            .route("", web::get().to(time_entries::list_time_entries))
            .route("", web::post().to(time_entries::create_time_entry))
            .route("/filter", web::get().to(time_entries::filter_time_entries))
            .route("/search", web::get().to(time_entries::search_time_entries))
            .route("/status/{date}", web::get().to(time_entries::status_for_date))
            .route("/date/{date}", web::get().to(time_entries::entries_by_date))
            .route("/user/{user_id}", web::get().to(time_entries::entries_by_user))
            .route(
                "/project/{project_id}",
                web::get().to(time_entries::entries_by_project),
            )
            .route("/range", web::get().to(time_entries::entries_in_range))
            .route(
                "/weekly-bulk",
                web::post().to(time_entries::create_weekly_bulk),
            )
            .route(
                "/weekly/{week_start}",
                web::get().to(time_entries::get_weekly_view),
            )
            .route(
                "/weekly/{week_start}",
                web::put().to(time_entries::update_weekly),
            )
            .route("/{id}", web::get().to(time_entries::get_time_entry))
            .route("/{id}", web::put().to(time_entries::update_time_entry))
            .route("/{id}", web::delete().to(time_entries::delete_time_entry))
            .route(
                "/{id}/approve",
                web::post().to(time_entries::approve_time_entry),
            )
            .route(
                "/{id}/reject",
                web::post().to(time_entries::reject_time_entry),
            )
            .route(
                "/{id}/history",
                web::get().to(time_entries::approval_history),
            ),
    );
}
