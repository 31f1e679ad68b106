//! In-memory store adapters.
//!
//! Used when no database URL is configured and by the integration tests.
//! They honour the same contracts as the Diesel adapters: a unique username
//! index, and a status update that only applies while a ticket is pending.

mod tickets;
mod users;

pub use tickets::MemoryTicketRepository;
pub use users::MemoryUserRepository;
