//! Port for one-way password hashing.
use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Producing a hash failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed or checked.
        Verify { message: String } => "password verification failed: {message}",
    }
}

/// Hashes and verifies passwords. Implementations may be slow by design and
/// are expected to keep that work off the async workers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a plaintext password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
