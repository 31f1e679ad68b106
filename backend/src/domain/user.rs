//! User data model.
//!
//! Users are created on registration and only ever mutated to attach a
//! profile image. The password hash travels with the record so the login
//! workflow can verify credentials, but it is never serialised.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ImageRef;

/// Minimum number of characters (exclusive) for usernames and passwords.
pub const CREDENTIAL_MIN_EXCLUSIVE: usize = 4;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The username did not exceed the minimum length.
    #[error("username must be longer than {min} characters")]
    UsernameTooShort {
        /// Exclusive lower bound on the character count.
        min: usize,
    },
    /// The role string was not recognised.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID, typically loaded from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login name.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed.
/// - Longer than [`CREDENTIAL_MIN_EXCLUSIVE`] characters once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.chars().count() <= CREDENTIAL_MIN_EXCLUSIVE {
            return Err(UserValidationError::UsernameTooShort {
                min: CREDENTIAL_MIN_EXCLUSIVE,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Rehydrate a username already validated by the store.
    pub(crate) fn from_trusted(username: String) -> Self {
        Self(username)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Access role carried by every user and bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Submits tickets and sees only their own.
    #[default]
    Employee,
    /// Reviews pending tickets and sees every ticket.
    Manager,
}

impl Role {
    /// Stable storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Employee" => Ok(Self::Employee),
            "Manager" => Ok(Self::Manager),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// One-way password hash produced by the configured hasher.
///
/// `Debug` is redacted so hashes never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash suitable for storage and verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` and `username` never change after registration.
/// - `image` is only set by a profile picture upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: PasswordHash,
    role: Role,
    image: Option<ImageRef>,
}

impl User {
    /// Build a freshly registered employee with a generated identifier.
    pub fn register(username: Username, password_hash: PasswordHash) -> Self {
        Self {
            id: UserId::random(),
            username,
            password_hash,
            role: Role::Employee,
            image: None,
        }
    }

    /// Rebuild a user from stored components.
    pub fn from_parts(
        id: UserId,
        username: Username,
        password_hash: PasswordHash,
        role: Role,
        image: Option<ImageRef>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            role,
            image,
        }
    }

    /// Return a copy carrying the given profile image.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Access role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Profile image, if one was uploaded.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }
}
