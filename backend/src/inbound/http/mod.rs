//! HTTP inbound adapter exposing REST endpoints.

pub mod admin_candidates;
pub mod admin_events;
pub mod error;
pub mod files;
pub mod health;
pub mod login;
pub mod schedule;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use cw_backend::inbound::http::api_routes;
///
/// let app = App::new().service(web::scope("/api/v1").configure(api_routes));
/// ```
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(schedule::current_schedule)
        .service(schedule::candidate_schedule)
        .service(schedule::event_details)
        .service(schedule::candidate_profile)
        .service(login::begin_login)
        .service(login::password_login)
        .service(login::register)
        .service(login::logout)
        .service(login::admin_login)
        .service(admin_events::get_weekend)
        .service(admin_events::set_weekend)
        .service(admin_events::list_events)
        .service(admin_events::create_event)
        .service(admin_events::get_event)
        .service(admin_events::update_event)
        .service(admin_events::delete_event)
        .service(admin_events::duplicate_event)
        .service(admin_events::upload_attachment)
        .service(admin_events::preview_schedule)
        .service(admin_candidates::list_candidates)
        .service(admin_candidates::import_roster)
        .service(admin_candidates::get_candidate)
        .service(admin_candidates::update_candidate)
        .service(admin_candidates::delete_candidate)
        .service(files::download);
}
