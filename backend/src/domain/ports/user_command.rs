//! Driving port for user account use-cases.
//!
//! Inbound adapters call it to register, log in and attach profile images
//! without knowing the backing infrastructure, so HTTP handler tests can
//! substitute a test double.

use async_trait::async_trait;

use crate::domain::{Error, ImageRef, LoginCredentials, Registration, User, UserId};

/// Domain use-case port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a new employee account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Verify credentials and return the matching user.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Record an already stored image as the user's profile picture.
    async fn attach_profile_image(&self, user_id: &UserId, image: ImageRef)
    -> Result<User, Error>;
}
