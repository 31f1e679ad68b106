//! bcrypt-backed `PasswordHasher`.
//!
//! Hashing is deliberately slow, so both operations run on the blocking pool
//! with the request's trace id carried across.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{PasswordHash, TraceId};

/// Password hasher using bcrypt with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Work factor applied when none is configured.
    pub const DEFAULT_COST: u32 = 10;

    /// Create a hasher with the given cost.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHasherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
{
    let trace_id = TraceId::current();
    tokio::task::spawn_blocking(move || TraceId::sync_scope(trace_id, work))
        .await
        .map_err(|err| PasswordHasherError::hash(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let cost = self.cost;
        let password = Zeroizing::new(password.to_owned());
        run_blocking(move || {
            bcrypt::hash(password.as_bytes(), cost)
                .map(PasswordHash::new)
                .map_err(|err| PasswordHasherError::hash(err.to_string()))
        })
        .await
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        run_blocking(move || {
            bcrypt::verify(password.as_bytes(), &encoded)
                .map_err(|err| PasswordHasherError::verify(err.to_string()))
        })
        .await
    }
}
