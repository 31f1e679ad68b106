//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{tickets, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Changeset replacing the profile image reference.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserImageUpdate<'a> {
    pub image_path: &'a str,
    pub image_url: &'a str,
}

/// Row struct for reading from the tickets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TicketRow {
    pub ticket_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub author: Uuid,
    pub status: String,
    pub resolver: Option<Uuid>,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
}

/// Insertable struct for creating new ticket records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub(crate) struct NewTicketRow<'a> {
    pub ticket_id: Uuid,
    pub amount: f64,
    pub description: &'a str,
    pub author: Uuid,
    pub status: &'a str,
}

/// Changeset applied by the conditional status update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketResolutionUpdate<'a> {
    pub status: &'a str,
    pub resolver: Uuid,
}

/// Changeset replacing the receipt image reference.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketImageUpdate<'a> {
    pub image_path: &'a str,
    pub image_url: &'a str,
}
