//! Multipart form parsing for image uploads.
//!
//! Both upload endpoints accept `multipart/form-data` with one `file` part
//! and optional short text fields (`ticket_id`). The whole file is buffered
//! in memory before it reaches the [`ImageStore`](crate::domain::ports::ImageStore),
//! so parts are capped.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{ImageStoreError, ImageUpload};

/// Form part carrying the uploaded file.
pub const FILE_FIELD: &str = "file";
/// Largest accepted file part in bytes.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 1024;

/// Parsed upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The `file` part, when one was sent.
    pub file: Option<ImageUpload>,
    text: HashMap<String, String>,
}

impl UploadForm {
    /// Value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    /// Take the uploaded file or fail with the client-facing message.
    pub fn require_file(&mut self) -> Result<ImageUpload, Error> {
        self.file
            .take()
            .ok_or_else(|| Error::invalid_request(ImageStoreError::empty_payload().to_string()))
    }
}

fn malformed(err: impl std::fmt::Display) -> Error {
    debug!(error = %err, "rejected multipart payload");
    Error::invalid_request("malformed multipart form")
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if buffer.len() + chunk.len() > limit {
            return Err(Error::invalid_request(format!(
                "form field exceeds {limit} bytes"
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Drain a multipart payload into an [`UploadForm`].
pub async fn read_upload_form(mut payload: Multipart) -> Result<UploadForm, Error> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == FILE_FIELD {
            let file_name = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .unwrap_or_default()
                .to_owned();
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = read_field(&mut field, MAX_FILE_BYTES).await?;
            form.file = Some(ImageUpload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let bytes = read_field(&mut field, MAX_TEXT_BYTES).await?;
            let value = String::from_utf8(bytes).map_err(malformed)?;
            form.text.insert(name, value);
        }
    }
    Ok(form)
}

/// Map image store failures to client or server errors.
pub fn map_image_store_error(err: ImageStoreError) -> Error {
    match err {
        ImageStoreError::EmptyPayload | ImageStoreError::InvalidFileName { .. } => {
            Error::invalid_request(err.to_string())
        }
        ImageStoreError::Write { message } | ImageStoreError::Read { message } => {
            Error::internal(message)
        }
    }
}
