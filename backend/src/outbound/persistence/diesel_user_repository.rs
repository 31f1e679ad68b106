//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{ImageRef, PasswordHash, Role, User, UserId, Username};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewUserRow, UserImageUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed credential store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) => UserPersistenceError::query("unique constraint"),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_insert_error(error: diesel::result::Error, username: &str) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::UniqueViolation(_) => UserPersistenceError::duplicate_username(username),
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let role: Role = row.role.parse().map_err(|err| {
        warn!(user_id = %row.id, value = %row.role, "unrecognised role in users table");
        UserPersistenceError::query(format!("corrupt user row: {err}"))
    })?;
    let image = match (row.image_path, row.image_url) {
        (Some(path), Some(url)) => Some(ImageRef::new(path, url)),
        _ => None,
    };

    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        Username::from_trusted(row.username),
        PasswordHash::new(row.password_hash),
        role,
        image,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let username = user.username().as_ref();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username,
            password_hash: user.password_hash().as_str(),
            role: user.role().as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, username))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn set_image(
        &self,
        id: &UserId,
        image: &ImageRef,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = UserImageUpdate {
            image_path: &image.file_path,
            image_url: &image.file_url,
        };

        let row: Option<UserRow> = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&update)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_user(row),
            None => Err(UserPersistenceError::not_found(id.to_string())),
        }
    }
}
