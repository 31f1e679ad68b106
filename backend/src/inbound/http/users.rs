//! User account handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"alice","password":"hunter22"}
//! POST /api/v1/login {"username":"alice","password":"hunter22"}
//! POST /api/v1/users/images (multipart: file)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{ImageOwner, TokenError};
use crate::domain::{
    CredentialsValidationError, Error, ErrorCode, LoginCredentials, Registration,
};

use super::ApiResult;
use super::auth::BearerAuth;
use super::dto::UserResponse;
use super::schemas::{ErrorSchema, ProfileImageForm};
use super::state::HttpState;
use super::uploads::{map_image_store_error, read_upload_form};

const LOGIN_MESSAGE: &str = "You have logged in successfully!";
const UPLOAD_MESSAGE: &str = "File uploaded successfully";

/// Request body for `POST /register` and `POST /login`.
///
/// Absent fields deserialise as empty strings so they fail the same
/// validation as blank ones.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "hunter22")]
    pub password: String,
}

/// Response for a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserResponse,
}

/// Response for a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "You have logged in successfully!")]
    pub message: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Response for a stored profile picture.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageResponse {
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    pub file_url: String,
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Register a new employee account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input or username taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&username, &password).map_err(map_credentials_error)?;
    let user = state
        .users
        .register(registration)
        .await
        .map_err(|err| match err.code() {
            // Duplicate usernames are reported as bad input on this route.
            ErrorCode::Conflict => Error::invalid_request(err.message()),
            _ => err,
        })?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        user: UserResponse::from(&user),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(map_credentials_error)?;
    let user = state.users.login(credentials).await?;
    let token = state.tokens.issue(&user).map_err(|err| match err {
        TokenError::Signing { message } => Error::internal(message),
        TokenError::Invalid { reason } => Error::internal(reason),
    })?;
    info!(user_id = %user.id(), "issued access token");
    Ok(HttpResponse::Ok().json(LoginResponse {
        message: LOGIN_MESSAGE.to_owned(),
        token: token.into_inner(),
    }))
}

/// Upload the caller's profile picture.
#[utoipa::path(
    post,
    path = "/api/v1/users/images",
    request_body(content = ProfileImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = ProfileImageResponse),
        (status = 400, description = "Missing or invalid file", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "uploadProfileImage"
)]
#[post("/users/images")]
pub async fn upload_profile_image(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let caller = auth.into_inner();
    let mut form = read_upload_form(payload).await?;
    let upload = form.require_file()?;
    let image = state
        .images
        .put(ImageOwner::User(caller.user_id), upload)
        .await
        .map_err(|err| {
            warn!(user_id = %caller.user_id, error = %err, "profile image upload failed");
            map_image_store_error(err)
        })?;
    let user = state
        .users
        .attach_profile_image(&caller.user_id, image.clone())
        .await?;
    info!(user_id = %user.id(), path = %image.file_path, "profile image attached");
    Ok(HttpResponse::Ok().json(ProfileImageResponse {
        message: UPLOAD_MESSAGE.to_owned(),
        file_url: image.file_url,
    }))
}
