//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the domain error wrappers from
//! [`crate::inbound::http::schemas`] and the bearer token security scheme.
//! Swagger UI serves it in debug builds and `openapi-dump` prints it.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ProfileImageForm, TicketImageForm,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/v1/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Expense reimbursement API",
        description = "Register, log in, submit reimbursement tickets and review them as a manager."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::upload_profile_image,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::list_pending_tickets,
        crate::inbound::http::tickets::process_ticket,
        crate::inbound::http::tickets::upload_ticket_image,
        crate::inbound::http::images::get_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, ProfileImageForm, TicketImageForm)),
    tags(
        (name = "users", description = "Registration, login and profile pictures"),
        (name = "tickets", description = "Reimbursement tickets"),
        (name = "images", description = "Uploaded profile pictures and receipts"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
