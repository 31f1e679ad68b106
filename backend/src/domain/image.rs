//! Reference to an image held by the object store.

use serde::{Deserialize, Serialize};

/// Location of an uploaded image.
///
/// `path` is the object key inside the store (`tickets/<id>/<file>` or
/// `users/<id>/<file>`); `url` is the public address derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Object key inside the store.
    pub file_path: String,
    /// Public URL for clients.
    pub file_url: String,
}

impl ImageRef {
    /// Build a reference from its stored path and public URL.
    pub fn new(file_path: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_url: file_url.into(),
        }
    }
}
