//! User account workflow.
//!
//! Implements [`UserCommand`] over a [`UserRepository`] and a
//! [`PasswordHasher`]. Login failures for unknown usernames and wrong
//! passwords are indistinguishable to callers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    PasswordHasher, PasswordHasherError, UserCommand, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, ImageRef, LoginCredentials, Registration, User, UserId};

const INVALID_LOGIN: &str = "Invalid username or password";
const USERNAME_TAKEN: &str = "Username already exists";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::NotFound { .. } => Error::not_found("User not found"),
        UserPersistenceError::DuplicateUsername { .. } => Error::conflict(USERNAME_TAKEN),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// User workflow implementing the [`UserCommand`] driving port.
pub struct UserService<R: ?Sized, H: ?Sized> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R: ?Sized, H: ?Sized> Clone for UserService<R, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<R: ?Sized, H: ?Sized> UserService<R, H> {
    /// Create a service over the credential store and password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<R, H> UserCommand for UserService<R, H>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let username = registration.username();
        let existing = self
            .users
            .find_by_username(username.as_ref())
            .await
            .map_err(map_repository_error)?;
        if existing.is_some() {
            info!(%username, "registration rejected: username already exists");
            return Err(Error::conflict(USERNAME_TAKEN));
        }

        let hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;
        let user = User::register(username.clone(), hash);

        self.users.insert(&user).await.map_err(|err| {
            if matches!(err, UserPersistenceError::DuplicateUsername { .. }) {
                info!(%username, "registration lost a race on the username index");
            }
            map_repository_error(err)
        })?;

        info!(user_id = %user.id(), %username, "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let Some(user) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_repository_error)?
        else {
            debug!(username = credentials.username(), "login failed: unknown user");
            return Err(Error::unauthorized(INVALID_LOGIN));
        };

        let valid = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hasher_error)?;
        if !valid {
            debug!(user_id = %user.id(), "login failed: password mismatch");
            return Err(Error::unauthorized(INVALID_LOGIN));
        }

        info!(user_id = %user.id(), "user logged in");
        Ok(user)
    }

    async fn attach_profile_image(
        &self,
        user_id: &UserId,
        image: ImageRef,
    ) -> Result<User, Error> {
        let user = self
            .users
            .set_image(user_id, &image)
            .await
            .map_err(|err| {
                warn!(%user_id, error = %err, "profile image update failed");
                map_repository_error(err)
            })?;
        info!(%user_id, path = %image.file_path, "profile image attached");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
