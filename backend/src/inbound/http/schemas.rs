//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`; the
//! wrappers here mirror their wire shape and register it with utoipa.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The bearer token is missing, invalid or expired, or the login
    /// credentials were wrong.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but the role may not perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested ticket or user does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Amount cannot be negative")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// Multipart body for `POST /users/images`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProfileImageForm {
    /// Image file; its name becomes the last object key segment.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Multipart body for `POST /tickets/images`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct TicketImageForm {
    /// Ticket receiving the receipt.
    #[schema(example = "6a1c3b9e-8f61-4b0e-9d43-2a4b0c1d2e3f")]
    ticket_id: String,
    /// Receipt image file.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "camelCase trace id");
        assert!(schema_json.contains("message"));
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }
}
