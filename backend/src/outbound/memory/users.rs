//! Mutex-guarded credential store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{ImageRef, User, UserId};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    by_username: HashMap<String, UserId>,
}

/// In-memory [`UserRepository`].
#[derive(Default)]
pub struct MemoryUserRepository {
    table: Mutex<UserTable>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `users`, e.g. seeded managers.
    ///
    /// Later entries with a duplicate username are ignored.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut table = UserTable::default();
        for user in users {
            let username = user.username().as_ref().to_owned();
            if table.by_username.contains_key(&username) {
                continue;
            }
            table.by_username.insert(username, *user.id());
            table.by_id.insert(*user.id(), user);
        }
        Self {
            table: Mutex::new(table),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .lock()
            .map_err(|_| UserPersistenceError::connection("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.lock()?;
        let username = user.username().as_ref();
        if table.by_username.contains_key(username) {
            return Err(UserPersistenceError::duplicate_username(username));
        }
        if table.by_id.contains_key(user.id()) {
            return Err(UserPersistenceError::query("duplicate user id"));
        }
        table.by_username.insert(username.to_owned(), *user.id());
        table.by_id.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.by_id.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.lock()?;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn set_image(
        &self,
        id: &UserId,
        image: &ImageRef,
    ) -> Result<User, UserPersistenceError> {
        let mut table = self.lock()?;
        let Some(user) = table.by_id.remove(id) else {
            return Err(UserPersistenceError::not_found(id.to_string()));
        };
        let updated = user.with_image(image.clone());
        table.by_id.insert(*id, updated.clone());
        Ok(updated)
    }
}
