//! Shared Diesel error mapping for the user and ticket repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Outcome of classifying a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(&'static str),
    /// A unique index rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
    /// Any other query failure.
    Query(&'static str),
}

/// Classify a Diesel error, logging the engine detail at debug level only.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(_, _) => DieselFailure::Query("database error"),
        _ => DieselFailure::Query("database error"),
    }
}
