//! Mutex-guarded ticket store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{ImageRef, Ticket, TicketId, TicketResolution, TicketStatus, UserId};

/// In-memory [`TicketRepository`]; keeps insertion order for listings.
#[derive(Default)]
pub struct MemoryTicketRepository {
    rows: Mutex<Vec<Ticket>>,
}

impl MemoryTicketRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Ticket>>, TicketPersistenceError> {
        self.rows
            .lock()
            .map_err(|_| TicketPersistenceError::connection("ticket store lock poisoned"))
    }

    fn filtered(
        &self,
        keep: impl Fn(&Ticket) -> bool,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        Ok(self.lock()?.iter().filter(|t| keep(t)).cloned().collect())
    }
}

fn find_mut<'a>(
    rows: &'a mut [Ticket],
    id: &TicketId,
) -> Result<&'a mut Ticket, TicketPersistenceError> {
    rows.iter_mut()
        .find(|ticket| ticket.id() == id)
        .ok_or_else(|| TicketPersistenceError::not_found(id.to_string()))
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let mut rows = self.lock()?;
        if rows.iter().any(|existing| existing.id() == ticket.id()) {
            return Err(TicketPersistenceError::query("duplicate ticket id"));
        }
        rows.push(ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        Ok(self.lock()?.iter().find(|t| t.id() == id).cloned())
    }

    async fn list_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        self.filtered(|t| t.status() == status)
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        self.filtered(|t| t.author() == author)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, TicketPersistenceError> {
        self.filtered(|_| true)
    }

    async fn resolve(
        &self,
        id: &TicketId,
        resolution: TicketResolution,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut rows = self.lock()?;
        let slot = find_mut(&mut rows, id)?;
        let resolved = slot
            .clone()
            .resolve(resolution)
            .map_err(|_| TicketPersistenceError::already_processed(id.to_string()))?;
        *slot = resolved.clone();
        Ok(resolved)
    }

    async fn set_image(
        &self,
        id: &TicketId,
        image: &ImageRef,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut rows = self.lock()?;
        let slot = find_mut(&mut rows, id)?;
        let updated = slot.clone().with_image(image.clone());
        *slot = updated.clone();
        Ok(updated)
    }
}
