//! Security adapters: password hashing and bearer token signing.

mod bcrypt_hasher;
mod jwt_token_service;
pub mod token_config;

pub use bcrypt_hasher::BcryptPasswordHasher;
pub use jwt_token_service::JwtTokenService;
pub use token_config::{BuildMode, TokenConfigError, TokenSettings, token_settings_from_env};
