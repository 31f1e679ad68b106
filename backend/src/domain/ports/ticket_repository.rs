//! Port abstraction for ticket persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ImageRef, Ticket, TicketId, TicketResolution, TicketStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ticket repository adapters.
    pub enum TicketPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ticket repository query failed: {message}",
        /// The targeted ticket does not exist.
        NotFound { ticket_id: String } => "ticket {ticket_id} not found",
        /// The ticket left `Pending` before the conditional update ran.
        AlreadyProcessed { ticket_id: String } => "ticket {ticket_id} already processed",
    }
}

/// Ticket store keyed by ticket id with status and author indexes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a new ticket record.
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError>;

    /// Fetch a ticket by identifier.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError>;

    /// List tickets through the status index.
    async fn list_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// List tickets through the author index.
    async fn list_by_author(&self, author: &UserId)
    -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Full scan of every ticket.
    async fn list_all(&self) -> Result<Vec<Ticket>, TicketPersistenceError>;

    /// Apply a decision only while the stored status is still `Pending`.
    ///
    /// Returns the updated record. A missing ticket yields
    /// [`TicketPersistenceError::NotFound`]; a ticket that is no longer
    /// pending yields [`TicketPersistenceError::AlreadyProcessed`].
    async fn resolve(
        &self,
        id: &TicketId,
        resolution: TicketResolution,
    ) -> Result<Ticket, TicketPersistenceError>;

    /// Replace the attached image reference and return the updated record.
    async fn set_image(
        &self,
        id: &TicketId,
        image: &ImageRef,
    ) -> Result<Ticket, TicketPersistenceError>;
}
