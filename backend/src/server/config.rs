//! Process settings and the runtime server configuration built from them.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::{DEFAULT_MAX_CONNECTIONS, DbPool};
use crate::outbound::security::{BcryptPasswordHasher, TokenSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IMAGE_ROOT: &str = "./var/images";
const DEFAULT_IMAGE_BASE_URL: &str = "http://localhost:8080/images";

/// Errors raised while interpreting [`ServerSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    /// The bcrypt cost was outside the range the hasher accepts.
    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    BcryptCost(u32),
}

/// Settings loaded from `REIMBURSE_*` environment variables, configuration
/// files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REIMBURSE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Directory holding uploaded images.
    pub image_root: Option<PathBuf>,
    /// Public URL prefix for uploaded images. The server answers
    /// `GET /images/{key}` itself, so the default points at this process;
    /// set it when a CDN or proxy fronts the image root instead.
    pub image_base_url: Option<String>,
    /// bcrypt work factor.
    #[ortho_config(default = 10)]
    pub bcrypt_cost: u32,
    /// Upper bound on pooled PostgreSQL connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: None,
            database_url: None,
            image_root: None,
            image_base_url: None,
            bcrypt_cost: BcryptPasswordHasher::DEFAULT_COST,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ServerSettings {
    /// Configured bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Non-blank database URL, if one was configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn image_root(&self) -> PathBuf {
        self.image_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_ROOT))
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    /// Pool size for the PostgreSQL store.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    /// Validated bcrypt cost.
    pub fn bcrypt_cost(&self) -> Result<u32, SettingsError> {
        if (4..=31).contains(&self.bcrypt_cost) {
            Ok(self.bcrypt_cost)
        } else {
            Err(SettingsError::BcryptCost(self.bcrypt_cost))
        }
    }
}

/// Image storage location.
#[derive(Debug, Clone)]
pub struct ImageStorageConfig {
    pub(crate) root: PathBuf,
    pub(crate) base_url: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: TokenSettings,
    pub(crate) images: ImageStorageConfig,
    pub(crate) bcrypt_cost: u32,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration that uses in-memory stores.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        tokens: TokenSettings,
        image_root: impl Into<PathBuf>,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            tokens,
            images: ImageStorageConfig {
                root: image_root.into(),
                base_url: image_base_url.into(),
            },
            bcrypt_cost: BcryptPasswordHasher::DEFAULT_COST,
            db_pool: None,
        }
    }

    /// Use PostgreSQL-backed repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "REIMBURSE_BIND_ADDR",
        "REIMBURSE_DATABASE_URL",
        "REIMBURSE_IMAGE_ROOT",
        "REIMBURSE_IMAGE_BASE_URL",
        "REIMBURSE_BCRYPT_COST",
        "REIMBURSE_DB_MAX_CONNECTIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("reimburse")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.image_root(), PathBuf::from(DEFAULT_IMAGE_ROOT));
        assert_eq!(settings.image_base_url(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(
            settings.bcrypt_cost().expect("default cost"),
            BcryptPasswordHasher::DEFAULT_COST
        );
        assert_eq!(settings.db_max_connections(), DEFAULT_MAX_CONNECTIONS);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("REIMBURSE_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "REIMBURSE_DATABASE_URL",
                Some("postgres://app@localhost/reimburse".to_owned()),
            ),
            ("REIMBURSE_IMAGE_ROOT", Some("/srv/images".to_owned())),
            (
                "REIMBURSE_IMAGE_BASE_URL",
                Some("https://cdn.example.test".to_owned()),
            ),
            ("REIMBURSE_BCRYPT_COST", Some("12".to_owned())),
            ("REIMBURSE_DB_MAX_CONNECTIONS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://app@localhost/reimburse")
        );
        assert_eq!(settings.image_root(), PathBuf::from("/srv/images"));
        assert_eq!(settings.image_base_url(), "https://cdn.example.test");
        assert_eq!(settings.bcrypt_cost().expect("cost"), 12);
        assert_eq!(settings.db_max_connections(), 3);
    }

    #[rstest]
    #[case(Some("   "))]
    #[case(Some(""))]
    #[case(None)]
    fn blank_database_url_selects_memory_stores(#[case] url: Option<&str>) {
        let settings = ServerSettings {
            database_url: url.map(str::to_owned),
            ..ServerSettings::default()
        };
        assert!(settings.database_url().is_none());
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let settings = ServerSettings {
            bind_addr: Some("localhost".to_owned()),
            bcrypt_cost: 2,
            ..ServerSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.bcrypt_cost(),
            Err(SettingsError::BcryptCost(2))
        ));
    }
}
