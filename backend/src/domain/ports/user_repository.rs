//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ImageRef, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The targeted user does not exist.
        NotFound { user_id: String } => "user {user_id} not found",
        /// The unique username index rejected the insert.
        DuplicateUsername { username: String } => "username {username} already exists",
    }
}

/// Credential store keyed by user id with a unique username index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    ///
    /// Fails with [`UserPersistenceError::DuplicateUsername`] when the
    /// username is already taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user through the username index.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Replace the profile image reference and return the updated record.
    async fn set_image(&self, id: &UserId, image: &ImageRef)
    -> Result<User, UserPersistenceError>;
}
