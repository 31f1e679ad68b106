//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel
//! - **memory**: mutex-guarded repositories for local runs and tests
//! - **security**: bcrypt password hashing and HS256 bearer tokens
//! - **storage**: filesystem image store rooted with `cap-std`
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
