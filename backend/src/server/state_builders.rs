//! Builders wiring store adapters, workflows and security adapters into the
//! HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use crate::domain::ports::{TicketRepository, UserRepository};
use crate::domain::{TicketService, UserService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{MemoryTicketRepository, MemoryUserRepository};
use crate::outbound::persistence::{DbPool, DieselTicketRepository, DieselUserRepository};
use crate::outbound::security::{BcryptPasswordHasher, JwtTokenService};
use crate::outbound::storage::FsImageStore;

use super::ServerConfig;

type Repositories = (Arc<dyn UserRepository>, Arc<dyn TicketRepository>);

/// Select PostgreSQL repositories when a pool is configured, otherwise
/// process-local in-memory ones.
fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL stores");
            (
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselTicketRepository::new(pool.clone())),
            )
        }
        None => {
            info!("no database configured; using in-memory stores");
            (
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemoryTicketRepository::new()),
            )
        }
    }
}

/// Build the HTTP state from server configuration.
///
/// # Errors
///
/// Returns the I/O error raised while opening the image root.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let (user_repository, ticket_repository) = build_repositories(config.db_pool.as_ref());
    let hasher = Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost));
    let users = Arc::new(UserService::new(user_repository, hasher));
    let tickets = Arc::new(TicketService::new(ticket_repository));
    let tokens = Arc::new(JwtTokenService::new(&config.tokens, Arc::new(DefaultClock)));
    let images = Arc::new(FsImageStore::open(
        &config.images.root,
        config.images.base_url.clone(),
    )?);

    Ok(HttpState::new(HttpStatePorts {
        users,
        tickets: tickets.clone(),
        tickets_query: tickets,
        tokens,
        images,
    }))
}
