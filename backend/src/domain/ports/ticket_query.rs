//! Driving port for ticket reads.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, Error, Ticket};

/// Domain use-case port for listing tickets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Every ticket still awaiting a decision.
    async fn list_pending(&self) -> Result<Vec<Ticket>, Error>;

    /// Tickets visible to `caller`: all of them for managers, their own
    /// for employees.
    async fn list_all(&self, caller: &AuthenticatedUser) -> Result<Vec<Ticket>, Error>;
}
