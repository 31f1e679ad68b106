//! Port for storing uploaded images.
use std::fmt;

use async_trait::async_trait;

use crate::domain::{ImageRef, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The upload carried no bytes.
        EmptyPayload => "No file provided for upload",
        /// The client file name cannot be used as an object key segment.
        InvalidFileName { file_name: String } => "invalid file name: {file_name}",
        /// Writing to the backing store failed.
        Write { message: String } => "image store write failed: {message}",
        /// Reading from the backing store failed.
        Read { message: String } => "image store read failed: {message}",
    }
}

/// Entity an uploaded image belongs to; selects the object key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    /// Profile picture stored under `users/<id>/`.
    User(UserId),
    /// Receipt stored under `tickets/<id>/`.
    Ticket(TicketId),
}

impl ImageOwner {
    /// Object key prefix without a trailing slash.
    pub fn prefix(&self) -> String {
        match self {
            Self::User(id) => format!("users/{id}"),
            Self::Ticket(id) => format!("tickets/{id}"),
        }
    }
}

/// File received from a client upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared MIME type, when present.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Validate a client file name for use as the final object key segment.
///
/// # Examples
/// ```
/// use reimburse::domain::ports::validate_file_name;
///
/// assert!(validate_file_name("receipt.png").is_ok());
/// assert!(validate_file_name("../etc/passwd").is_err());
/// ```
pub fn validate_file_name(file_name: &str) -> Result<&str, ImageStoreError> {
    let invalid = file_name.trim().is_empty()
        || file_name.contains(['/', '\\'])
        || file_name == "."
        || file_name == ".."
        || file_name.chars().any(char::is_control);
    if invalid {
        return Err(ImageStoreError::invalid_file_name(file_name));
    }
    Ok(file_name)
}

/// Validate a stored object key such as `tickets/<id>/receipt.png`.
///
/// Every `/`-separated segment must pass [`validate_file_name`], so keys
/// cannot be absolute or climb out of the store root.
pub fn validate_image_key(key: &str) -> Result<&str, ImageStoreError> {
    if key.split('/').all(|segment| validate_file_name(segment).is_ok()) {
        Ok(key)
    } else {
        Err(ImageStoreError::invalid_file_name(key))
    }
}

/// MIME type served for an object key, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Object storage for profile pictures and receipts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `upload` under the owner's prefix and return its location.
    async fn put(&self, owner: ImageOwner, upload: ImageUpload)
    -> Result<ImageRef, ImageStoreError>;

    /// Read the object stored under `key`; `None` when nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ImageStoreError>;
}
