//! Bearer token configuration parsing and validation.
//!
//! Reads `ACCESS_TOKEN_SECRET` and `ACCESS_TOKEN_TTL_MINUTES` through
//! [`mockable::Env`] so the rules can be tested without touching the process
//! environment.

use std::fmt;
use std::time::Duration;

use mockable::Env;
use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

const SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";
const TTL_ENV: &str = "ACCESS_TOKEN_TTL_MINUTES";
const SECRET_MIN_LEN: usize = 32;
const DEFAULT_TTL_MINUTES: u64 = 150;
const TTL_EXPECTED: &str = "a positive number of minutes";

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit, valid settings.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reimburse::outbound::security::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated signing settings for bearer tokens.
#[derive(Clone)]
pub struct TokenSettings {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl TokenSettings {
    /// Build settings directly, e.g. in tests.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            ttl,
        }
    }

    /// HMAC signing secret.
    pub fn secret(&self) -> &[u8] {
        self.secret.as_slice()
    }

    /// Lifetime of an issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The signing secret is too short for release builds.
    #[error("{name} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        name: &'static str,
        length: usize,
        min_len: usize,
    },
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use reimburse::outbound::security::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "ACCESS_TOKEN_SECRET" => Some("x".repeat(32)),
///     "ACCESS_TOKEN_TTL_MINUTES" => Some("30".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release).unwrap();
/// assert_eq!(settings.ttl().as_secs(), 30 * 60);
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let secret = secret_from_env(env, mode)?;
    let ttl = ttl_from_env(env, mode)?;
    Ok(TokenSettings { secret, ttl })
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let Some(value) = env.string(SECRET_ENV) else {
        if mode.is_debug() {
            warn!("ACCESS_TOKEN_SECRET not set; using temporary secret (dev only)");
            return Ok(ephemeral_secret());
        }
        return Err(TokenConfigError::MissingEnv { name: SECRET_ENV });
    };

    let secret = Zeroizing::new(value.into_bytes());
    let length = secret.len();
    if length < SECRET_MIN_LEN {
        if mode.is_debug() && length > 0 {
            warn!(length, "ACCESS_TOKEN_SECRET shorter than {SECRET_MIN_LEN} bytes");
        } else if mode.is_debug() {
            warn!("ACCESS_TOKEN_SECRET empty; using temporary secret (dev only)");
            return Ok(ephemeral_secret());
        } else {
            return Err(TokenConfigError::SecretTooShort {
                name: SECRET_ENV,
                length,
                min_len: SECRET_MIN_LEN,
            });
        }
    }
    Ok(secret)
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Vec::with_capacity(SECRET_MIN_LEN);
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    Zeroizing::new(bytes)
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, TokenConfigError> {
    let default = Duration::from_secs(DEFAULT_TTL_MINUTES * 60);
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(default);
    };

    match value.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 => Ok(Duration::from_secs(minutes.saturating_mul(60))),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid ACCESS_TOKEN_TTL_MINUTES; using default");
            Ok(default)
        }
        _ => Err(TokenConfigError::InvalidEnv {
            name: TTL_ENV,
            value,
            expected: TTL_EXPECTED,
        }),
    }
}
