//! Port for issuing and verifying bearer tokens.
use std::fmt;

use crate::domain::{AuthenticatedUser, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The presented token failed verification.
        Invalid { reason: String } => "invalid token: {reason}",
        /// Signing a new token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Signed bearer token handed to clients after login.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consume the wrapper and return the encoded token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Issues and verifies signed, time-limited identity tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token describing `user`.
    fn issue(&self, user: &User) -> Result<AccessToken, TokenError>;

    /// Verify integrity and expiry, returning the embedded identity.
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError>;
}
