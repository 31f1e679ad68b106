//! Wire representations shared by the user and ticket handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ImageRef, Ticket, User};

/// Stored image location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    /// Object key inside the store.
    #[schema(example = "tickets/6a1c3b9e-8f61-4b0e-9d43-2a4b0c1d2e3f/receipt.png")]
    pub file_path: String,
    /// Public URL for the image.
    pub file_url: String,
}

impl From<&ImageRef> for ImageResponse {
    fn from(value: &ImageRef) -> Self {
        Self {
            file_path: value.file_path.clone(),
            file_url: value.file_url.clone(),
        }
    }
}

/// Public view of a user; the password hash is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Employee")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageResponse>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            role: user.role().as_str().to_owned(),
            image: user.image().map(ImageResponse::from),
        }
    }
}

/// Reimbursement ticket as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    #[schema(example = "6a1c3b9e-8f61-4b0e-9d43-2a4b0c1d2e3f")]
    pub ticket_id: String,
    #[schema(example = 42.5)]
    pub amount: f64,
    #[schema(example = "Train fare to client site")]
    pub description: String,
    /// Identifier of the submitting user.
    pub author: String,
    #[schema(example = "Pending")]
    pub status: String,
    /// Manager who approved or rejected the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageResponse>,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id().to_string(),
            amount: ticket.amount().value(),
            description: ticket.description().as_ref().to_owned(),
            author: ticket.author().to_string(),
            status: ticket.status().as_str().to_owned(),
            resolver: ticket.resolver().map(ToString::to_string),
            image: ticket.image().map(ImageResponse::from),
        }
    }
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self::from(&ticket)
    }
}
