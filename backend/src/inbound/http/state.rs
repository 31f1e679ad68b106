//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ImageStore, TicketCommand, TicketQuery, TokenService, UserCommand};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub tokens: Arc<dyn TokenService>,
    pub images: Arc<dyn ImageStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub tokens: Arc<dyn TokenService>,
    pub images: Arc<dyn ImageStore>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            tickets,
            tickets_query,
            tokens,
            images,
        } = ports;
        Self {
            users,
            tickets,
            tickets_query,
            tokens,
            images,
        }
    }
}
