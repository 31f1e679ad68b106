//! Authentication primitives: credentials, authenticated identities and the
//! role gate.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a service.

use zeroize::Zeroizing;

use super::user::CREDENTIAL_MIN_EXCLUSIVE;
use super::{Error, Role, UserId, Username};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Username or password was missing or blank.
    #[error("Username and password are required")]
    Missing,
    /// Username or password did not exceed the minimum length.
    #[error("Username and Password must be longer than 4 characters")]
    TooShort,
}

/// Validated login credentials used by the user workflow.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use reimburse::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("alice", "password").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() || password.is_empty() {
            return Err(CredentialsValidationError::Missing);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
///
/// Both fields must be longer than four characters. The password keeps
/// caller whitespace and is zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw inputs.
    ///
    /// # Examples
    /// ```
    /// use reimburse::domain::{CredentialsValidationError, Registration};
    ///
    /// let err = Registration::try_from_parts("alice", "pass").unwrap_err();
    /// assert_eq!(err, CredentialsValidationError::TooShort);
    /// ```
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(CredentialsValidationError::Missing);
        }
        if password.chars().count() <= CREDENTIAL_MIN_EXCLUSIVE {
            return Err(CredentialsValidationError::TooShort);
        }
        let username =
            Username::new(username).map_err(|_| CredentialsValidationError::TooShort)?;

        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Identity recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Identifier of the token subject.
    pub user_id: UserId,
    /// Username embedded at issue time.
    pub username: Username,
    /// Role embedded at issue time.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Require that this identity holds one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), Error> {
        authorize(self.role, allowed)
    }
}

/// Pure role membership check.
///
/// # Examples
/// ```
/// use reimburse::domain::{authorize, ErrorCode, Role};
///
/// assert!(authorize(Role::Manager, &[Role::Manager]).is_ok());
/// let err = authorize(Role::Employee, &[Role::Manager]).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), Error> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(Error::forbidden("insufficient role for this operation"))
    }
}
