//! Ticket workflow.
//!
//! Implements [`TicketCommand`] and [`TicketQuery`] over a
//! [`TicketRepository`]. Status changes go through [`Ticket::resolve`] for
//! validation and then through the store's conditional update, so a
//! concurrent decision on the same ticket surfaces as a conflict.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    TicketCommand, TicketPersistenceError, TicketQuery, TicketRepository,
};
use crate::domain::{
    AuthenticatedUser, Error, ImageRef, Role, Ticket, TicketDecision, TicketDraft, TicketId,
    TicketImage, TicketResolution, TicketStatus, UserId,
};

const TICKET_NOT_FOUND: &str = "Ticket not found";
const ALREADY_PROCESSED: &str = "Ticket already processed";

fn map_repository_error(error: TicketPersistenceError) -> Error {
    match error {
        TicketPersistenceError::Connection { message } => {
            Error::internal(format!("ticket repository unavailable: {message}"))
        }
        TicketPersistenceError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
        TicketPersistenceError::NotFound { .. } => Error::not_found(TICKET_NOT_FOUND),
        TicketPersistenceError::AlreadyProcessed { .. } => Error::conflict(ALREADY_PROCESSED),
    }
}

/// Ticket workflow implementing the ticket driving ports.
pub struct TicketService<R: ?Sized> {
    tickets: Arc<R>,
}

impl<R: ?Sized> Clone for TicketService<R> {
    fn clone(&self) -> Self {
        Self {
            tickets: Arc::clone(&self.tickets),
        }
    }
}

impl<R: ?Sized> TicketService<R> {
    /// Create a service over the ticket store.
    pub fn new(tickets: Arc<R>) -> Self {
        Self { tickets }
    }
}

#[async_trait]
impl<R> TicketCommand for TicketService<R>
where
    R: TicketRepository + ?Sized,
{
    async fn create(&self, draft: TicketDraft, author: &UserId) -> Result<Ticket, Error> {
        let ticket = Ticket::submit(draft, *author);
        self.tickets
            .insert(&ticket)
            .await
            .map_err(map_repository_error)?;
        info!(ticket_id = %ticket.id(), %author, "ticket created");
        Ok(ticket)
    }

    async fn process(
        &self,
        ticket_id: &TicketId,
        decision: TicketDecision,
        resolver: &UserId,
    ) -> Result<Ticket, Error> {
        let current = self
            .tickets
            .find_by_id(ticket_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(TICKET_NOT_FOUND))?;

        let resolution = TicketResolution {
            decision,
            resolver: *resolver,
        };
        current.resolve(resolution).map_err(|err| {
            info!(%ticket_id, error = %err, "ticket processing rejected");
            Error::conflict(ALREADY_PROCESSED)
        })?;

        let updated = self
            .tickets
            .resolve(ticket_id, resolution)
            .await
            .map_err(|err| {
                warn!(%ticket_id, error = %err, "conditional ticket update failed");
                map_repository_error(err)
            })?;
        info!(%ticket_id, status = %updated.status(), %resolver, "ticket processed");
        Ok(updated)
    }

    async fn attach_image(
        &self,
        ticket_id: &TicketId,
        image: ImageRef,
    ) -> Result<TicketImage, Error> {
        let ticket = self
            .tickets
            .set_image(ticket_id, &image)
            .await
            .map_err(map_repository_error)?;
        info!(%ticket_id, path = %image.file_path, "ticket image attached");
        Ok(TicketImage {
            ticket_id: *ticket_id,
            image,
            ticket,
        })
    }
}

#[async_trait]
impl<R> TicketQuery for TicketService<R>
where
    R: TicketRepository + ?Sized,
{
    async fn list_pending(&self) -> Result<Vec<Ticket>, Error> {
        self.tickets
            .list_by_status(TicketStatus::Pending)
            .await
            .map_err(map_repository_error)
    }

    async fn list_all(&self, caller: &AuthenticatedUser) -> Result<Vec<Ticket>, Error> {
        let result = match caller.role {
            Role::Manager => self.tickets.list_all().await,
            Role::Employee => self.tickets.list_by_author(&caller.user_id).await,
        };
        result.map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
