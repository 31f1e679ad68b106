//! Reimbursement ticket handlers.
//!
//! ```text
//! POST /api/v1/tickets {"amount":42.5,"description":"Train fare"}
//! GET  /api/v1/tickets
//! GET  /api/v1/tickets/pending            (Manager)
//! PUT  /api/v1/tickets/{id}?status=Approved (Manager)
//! POST /api/v1/tickets/images (multipart: file, ticket_id)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ImageOwner;
use crate::domain::{Error, Role, Ticket, TicketDecision, TicketDraft, TicketId};

use super::ApiResult;
use super::auth::BearerAuth;
use super::dto::TicketResponse;
use super::schemas::{ErrorSchema, TicketImageForm};
use super::state::HttpState;
use super::uploads::{map_image_store_error, read_upload_form};

const MISSING_FIELDS: &str = "Request cannot be submitted without amount or description";
const TICKET_ID_FIELD: &str = "ticket_id";
const TICKET_NOT_FOUND: &str = "Ticket not found";

/// Request body for `POST /tickets`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTicketRequest {
    #[schema(example = 42.5)]
    pub amount: Option<f64>,
    #[schema(example = "Train fare to client site")]
    pub description: Option<String>,
}

/// Response for a created ticket.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTicketResponse {
    #[schema(example = "Ticket created")]
    pub message: String,
    pub ticket: TicketResponse,
}

/// Query string for `PUT /tickets/{id}`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProcessTicketQuery {
    /// `Approved` or `Rejected`.
    #[param(example = "Approved")]
    pub status: Option<String>,
}

/// Response for an attached receipt.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketImageResponse {
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    pub file_url: String,
    pub ticket: TicketResponse,
}

/// An id that cannot be parsed names no ticket, so it is reported as missing.
fn parse_ticket_id(raw: &str) -> Result<TicketId, Error> {
    TicketId::new(raw).map_err(|_| Error::not_found(TICKET_NOT_FOUND))
}

fn to_responses(tickets: Vec<Ticket>) -> Vec<TicketResponse> {
    tickets.iter().map(TicketResponse::from).collect()
}

/// Submit a reimbursement ticket.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = CreateTicketResponse),
        (status = 400, description = "Invalid amount or description", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: web::Json<CreateTicketRequest>,
) -> ApiResult<HttpResponse> {
    let CreateTicketRequest {
        amount,
        description,
    } = payload.into_inner();
    let (Some(amount), Some(description)) = (amount, description) else {
        return Err(Error::invalid_request(MISSING_FIELDS));
    };
    let draft = TicketDraft::try_from_parts(amount, description)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let ticket = state
        .tickets
        .create(draft, &auth.identity().user_id)
        .await?;
    Ok(HttpResponse::Created().json(CreateTicketResponse {
        message: "Ticket created".to_owned(),
        ticket: TicketResponse::from(&ticket),
    }))
}

/// List tickets visible to the caller.
///
/// Managers see every ticket; employees see only their own.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    responses(
        (status = 200, description = "Tickets", body = [TicketResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<TicketResponse>>> {
    let tickets = state.tickets_query.list_all(auth.identity()).await?;
    Ok(web::Json(to_responses(tickets)))
}

/// List tickets awaiting review.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/pending",
    responses(
        (status = 200, description = "Pending tickets", body = [TicketResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a manager", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listPendingTickets"
)]
#[get("/tickets/pending")]
pub async fn list_pending_tickets(
    state: web::Data<HttpState>,
    auth: BearerAuth,
) -> ApiResult<web::Json<Vec<TicketResponse>>> {
    auth.require_role(&[Role::Manager])?;
    let tickets = state.tickets_query.list_pending().await?;
    Ok(web::Json(to_responses(tickets)))
}

/// Approve or reject a pending ticket.
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}",
    params(
        ("id" = String, Path, description = "Ticket identifier"),
        ProcessTicketQuery
    ),
    responses(
        (status = 200, description = "Processed ticket", body = TicketResponse),
        (status = 400, description = "Missing or invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a manager", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema),
        (status = 409, description = "Ticket already processed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "processTicket"
)]
#[put("/tickets/{id}")]
pub async fn process_ticket(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<String>,
    query: web::Query<ProcessTicketQuery>,
) -> ApiResult<web::Json<TicketResponse>> {
    let resolver = auth.require_role(&[Role::Manager])?.user_id;
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let decision = query
        .into_inner()
        .status
        .ok_or_else(|| Error::invalid_request("status query parameter is required"))?
        .parse::<TicketDecision>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let ticket = state
        .tickets
        .process(&ticket_id, decision, &resolver)
        .await?;
    Ok(web::Json(TicketResponse::from(&ticket)))
}

/// Attach a receipt image to a ticket.
///
/// The file is stored first and then recorded on the ticket.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/images",
    request_body(content = TicketImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored and attached", body = TicketImageResponse),
        (status = 400, description = "Missing file or ticket id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Ticket not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "uploadTicketImage"
)]
#[post("/tickets/images")]
pub async fn upload_ticket_image(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let mut form = read_upload_form(payload).await?;
    let raw_id = form
        .text(TICKET_ID_FIELD)
        .ok_or_else(|| Error::invalid_request("ticket_id is required"))?;
    let ticket_id = parse_ticket_id(raw_id.trim())?;
    let upload = form.require_file()?;
    let image = state
        .images
        .put(ImageOwner::Ticket(ticket_id), upload)
        .await
        .map_err(|err| {
            warn!(%ticket_id, error = %err, "ticket image upload failed");
            map_image_store_error(err)
        })?;
    let file_url = image.file_url.clone();
    let attached = state.tickets.attach_image(&ticket_id, image).await?;
    info!(
        %ticket_id,
        uploader = %auth.identity().user_id,
        path = %attached.image.file_path,
        "receipt attached"
    );
    Ok(HttpResponse::Ok().json(TicketImageResponse {
        message: "File uploaded successfully".to_owned(),
        file_url,
        ticket: TicketResponse::from(&attached.ticket),
    }))
}
