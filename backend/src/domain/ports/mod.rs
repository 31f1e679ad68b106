//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PasswordHasher`], [`TokenService`],
//! [`ImageStore`]) expose strongly typed errors so adapters map their
//! failures into predictable variants. Driving ports ([`UserCommand`],
//! [`TicketCommand`], [`TicketQuery`]) return the domain [`Error`].
//!
//! [`Error`]: crate::domain::Error

mod macros;
pub(crate) use macros::define_port_error;

mod image_store;
mod password_hasher;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod token_service;
mod user_command;
mod user_repository;

#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{
    ImageOwner, ImageStore, ImageStoreError, ImageUpload, content_type_for, validate_file_name,
    validate_image_key,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::TicketCommand;
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::TicketQuery;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketPersistenceError, TicketRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{AccessToken, TokenError, TokenService};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::UserCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
