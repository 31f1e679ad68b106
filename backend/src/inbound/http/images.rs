//! Public read access to uploaded images.
//!
//! ```text
//! GET /images/{key}
//! ```
//!
//! Keys are the `file_path` values returned by the upload endpoints, so the
//! default image base URL resolves against this route.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{ImageStoreError, content_type_for};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const IMAGE_NOT_FOUND: &str = "Image not found";

/// Serve a stored profile picture or receipt.
#[utoipa::path(
    get,
    path = "/images/{key}",
    params(("key" = String, Path, description = "Object key, e.g. `tickets/<id>/receipt.png`")),
    responses(
        (status = 200, description = "Image bytes with a type inferred from the key extension"),
        (status = 404, description = "Image not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    security([]),
    operation_id = "getImage"
)]
#[get("/images/{key:.*}")]
pub async fn get_image(
    state: web::Data<HttpState>,
    key: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = key.into_inner();
    let bytes = match state.images.get(&key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(ImageStoreError::InvalidFileName { .. }) => {
            return Err(Error::not_found(IMAGE_NOT_FOUND));
        }
        Err(err) => {
            warn!(%key, error = %err, "image read failed");
            return Err(Error::internal(err.to_string()));
        }
    };
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(&key)))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(bytes))
}
