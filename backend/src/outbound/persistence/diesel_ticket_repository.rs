//! PostgreSQL-backed `TicketRepository` implementation using Diesel ORM.
//!
//! Status changes use a single conditional `UPDATE ... WHERE status =
//! 'Pending' RETURNING *`. When no row comes back the adapter looks the
//! ticket up again to tell a missing ticket from one that lost the race.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{TicketPersistenceError, TicketRepository};
use crate::domain::{
    Amount, Description, ImageRef, Ticket, TicketId, TicketParts, TicketResolution,
    TicketStatus, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewTicketRow, TicketImageUpdate, TicketResolutionUpdate, TicketRow};
use super::pool::{DbPool, PoolError};
use super::schema::tickets;

/// Diesel-backed ticket store.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TicketPersistenceError {
    TicketPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> TicketPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => TicketPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) => TicketPersistenceError::query("unique constraint"),
        DieselFailure::Query(message) => TicketPersistenceError::query(message),
    }
}

fn corrupt(ticket_id: Uuid, field: &str, detail: impl std::fmt::Display) -> TicketPersistenceError {
    warn!(%ticket_id, field, %detail, "corrupt ticket row");
    TicketPersistenceError::query(format!("corrupt ticket row: {field}: {detail}"))
}

fn row_to_ticket(row: TicketRow) -> Result<Ticket, TicketPersistenceError> {
    let id = row.ticket_id;
    let amount = Amount::new(row.amount).map_err(|err| corrupt(id, "amount", err))?;
    let description =
        Description::new(row.description).map_err(|err| corrupt(id, "description", err))?;
    let status: TicketStatus = row
        .status
        .parse()
        .map_err(|err| corrupt(id, "status", err))?;
    let image = match (row.image_path, row.image_url) {
        (Some(path), Some(url)) => Some(ImageRef::new(path, url)),
        _ => None,
    };

    Ok(Ticket::from_parts(TicketParts {
        id: TicketId::from_uuid(id),
        amount,
        description,
        author: UserId::from_uuid(row.author),
        status,
        resolver: row.resolver.map(UserId::from_uuid),
        image,
    }))
}

fn rows_to_tickets(rows: Vec<TicketRow>) -> Result<Vec<Ticket>, TicketPersistenceError> {
    rows.into_iter().map(row_to_ticket).collect()
}

/// Explain why a conditional update touched no row.
async fn handle_resolve_failure<C>(conn: &mut C, ticket_id: &TicketId) -> TicketPersistenceError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = tickets::table
        .filter(tickets::ticket_id.eq(ticket_id.as_uuid()))
        .select(tickets::status)
        .first::<String>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(_)) => TicketPersistenceError::already_processed(ticket_id.to_string()),
        Ok(None) => TicketPersistenceError::not_found(ticket_id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTicketRow {
            ticket_id: *ticket.id().as_uuid(),
            amount: ticket.amount().value(),
            description: ticket.description().as_ref(),
            author: *ticket.author().as_uuid(),
            status: ticket.status().as_str(),
        };

        diesel::insert_into(tickets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TicketRow> = tickets::table
            .filter(tickets::ticket_id.eq(id.as_uuid()))
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_ticket).transpose()
    }

    async fn list_by_status(
        &self,
        status: TicketStatus,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::status.eq(status.as_str()))
            .order(tickets::created_at.asc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_tickets(rows)
    }

    async fn list_by_author(
        &self,
        author: &UserId,
    ) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TicketRow> = tickets::table
            .filter(tickets::author.eq(author.as_uuid()))
            .order(tickets::created_at.asc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_tickets(rows)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TicketRow> = tickets::table
            .order(tickets::created_at.asc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_tickets(rows)
    }

    async fn resolve(
        &self,
        id: &TicketId,
        resolution: TicketResolution,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = TicketResolutionUpdate {
            status: resolution.decision.status().as_str(),
            resolver: *resolution.resolver.as_uuid(),
        };

        let row: Option<TicketRow> = diesel::update(
            tickets::table
                .filter(tickets::ticket_id.eq(id.as_uuid()))
                .filter(tickets::status.eq(TicketStatus::Pending.as_str())),
        )
        .set(&update)
        .returning(TicketRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_ticket(row),
            None => Err(handle_resolve_failure(&mut conn, id).await),
        }
    }

    async fn set_image(
        &self,
        id: &TicketId,
        image: &ImageRef,
    ) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = TicketImageUpdate {
            image_path: &image.file_path,
            image_url: &image.file_url,
        };

        let row: Option<TicketRow> =
            diesel::update(tickets::table.filter(tickets::ticket_id.eq(id.as_uuid())))
                .set(&update)
                .returning(TicketRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_ticket(row),
            None => Err(TicketPersistenceError::not_found(id.to_string())),
        }
    }
}
