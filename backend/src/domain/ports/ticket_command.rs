//! Driving port for ticket mutations.

use async_trait::async_trait;

use crate::domain::{
    Error, ImageRef, Ticket, TicketDecision, TicketDraft, TicketId, TicketImage, UserId,
};

/// Domain use-case port for submitting and processing tickets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// Submit a pending ticket authored by `author`.
    async fn create(&self, draft: TicketDraft, author: &UserId) -> Result<Ticket, Error>;

    /// Approve or reject a pending ticket on behalf of `resolver`.
    async fn process(
        &self,
        ticket_id: &TicketId,
        decision: TicketDecision,
        resolver: &UserId,
    ) -> Result<Ticket, Error>;

    /// Record an already stored image as the ticket's receipt.
    async fn attach_image(
        &self,
        ticket_id: &TicketId,
        image: ImageRef,
    ) -> Result<TicketImage, Error>;
}
