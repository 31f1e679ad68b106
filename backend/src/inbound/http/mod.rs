//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod images;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod uploads;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Mount every API route under the current scope.
///
/// Routes with literal segments are registered before `/tickets/{id}` so
/// `/tickets/pending` and `/tickets/images` never reach the id matcher.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::upload_profile_image)
        .service(tickets::upload_ticket_image)
        .service(tickets::list_pending_tickets)
        .service(tickets::create_ticket)
        .service(tickets::list_tickets)
        .service(tickets::process_ticket);
}

/// JSON extractor configuration that reports malformed bodies with the
/// shared error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(error::json_error_handler)
}
