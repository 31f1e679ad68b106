//! Filesystem-backed `ImageStore` built on `cap-std`.
//!
//! All writes are confined to a single root directory opened once at
//! startup. Object keys take the form `<prefix>/<file name>` and files are
//! written through a temporary name and renamed into place, so readers never
//! observe a partial upload.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{
    ImageOwner, ImageStore, ImageStoreError, ImageUpload, validate_file_name, validate_image_key,
};
use crate::domain::{ImageRef, TraceId};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Image store writing below a root directory and serving from a base URL.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
    base_url: String,
}

impl FsImageStore {
    /// Open (creating if needed) `root` and serve objects from `base_url`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening `root`.
    pub fn open(root: impl AsRef<Path>, base_url: impl Into<String>) -> std::io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }
}

fn write_object(
    root: &Dir,
    prefix: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<(), ImageStoreError> {
    let write_error = |err: std::io::Error| ImageStoreError::write(err.to_string());
    root.create_dir_all(prefix).map_err(write_error)?;
    let dir = root.open_dir(prefix).map_err(write_error)?;

    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{file_name}.tmp.{}.{counter}", std::process::id());
    dir.write(&tmp_name, bytes).map_err(write_error)?;
    if let Err(err) = dir.rename(&tmp_name, &dir, file_name) {
        if let Err(cleanup) = dir.remove_file(&tmp_name) {
            debug!(file = %tmp_name, error = %cleanup, "failed to remove temporary upload");
        }
        return Err(write_error(err));
    }
    Ok(())
}

fn read_object(root: &Dir, key: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
    match root.read(key) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err)
            if matches!(
                err.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
            ) =>
        {
            Ok(None)
        }
        Err(err) => Err(ImageStoreError::read(err.to_string())),
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(
        &self,
        owner: ImageOwner,
        upload: ImageUpload,
    ) -> Result<ImageRef, ImageStoreError> {
        if upload.bytes.is_empty() {
            return Err(ImageStoreError::empty_payload());
        }
        let file_name = validate_file_name(&upload.file_name)?.to_owned();
        let prefix = owner.prefix();
        let key = format!("{prefix}/{file_name}");

        let root = Arc::clone(&self.root);
        let trace_id = TraceId::current();
        let bytes = upload.bytes;
        let name = file_name.clone();
        tokio::task::spawn_blocking(move || {
            TraceId::sync_scope(trace_id, || write_object(&root, &prefix, &name, &bytes))
        })
        .await
        .map_err(|err| ImageStoreError::write(format!("storage task failed: {err}")))??;

        debug!(
            %key,
            content_type = upload.content_type.as_deref().unwrap_or("unknown"),
            "image stored"
        );
        Ok(ImageRef::new(key.clone(), self.url_for(&key)))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let key = validate_image_key(key)?.to_owned();
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || read_object(&root, &key))
            .await
            .map_err(|err| ImageStoreError::read(format!("storage task failed: {err}")))?
    }
}
