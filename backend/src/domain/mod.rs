//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! adapters, the workflows that enforce business rules on them, and the
//! ports those workflows depend on. Keep types immutable and document
//! invariants in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error envelope and stable error identifier.
//! - User / Ticket: the two persisted aggregates.
//! - UserService / TicketService: workflows implementing the driving ports.

pub mod auth;
pub mod error;
pub mod image;
pub mod ports;
pub mod ticket;
pub mod ticket_service;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{
    AuthenticatedUser, CredentialsValidationError, LoginCredentials, Registration, authorize,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image::ImageRef;
pub use self::ticket::{
    Amount, Description, Ticket, TicketDecision, TicketDraft, TicketId, TicketImage, TicketParts,
    TicketResolution, TicketStatus, TicketTransitionError, TicketValidationError,
};
pub use self::ticket_service::TicketService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    CREDENTIAL_MIN_EXCLUSIVE, PasswordHash, Role, User, UserId, UserValidationError, Username,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use reimburse::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
