//! Backend entry-point: loads settings, prepares storage and serves the API.

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use reimburse::inbound::http::health::HealthState;
use reimburse::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use reimburse::outbound::security::{BuildMode, token_settings_from_env};
use reimburse::server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("failed to load server settings")?;
    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid access token configuration")?;
    let bind_addr = settings.bind_addr()?;

    let mut config = ServerConfig::new(
        bind_addr,
        tokens,
        settings.image_root(),
        settings.image_base_url(),
    )
    .with_bcrypt_cost(settings.bcrypt_cost()?);

    if let Some(database_url) = settings.database_url() {
        let applied = run_pending_migrations(database_url)
            .await
            .wrap_err("failed to apply database migrations")?;
        info!(applied, "database migrations complete");
        let pool_config =
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections());
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting HTTP server");
    let server = create_server(health_state, config).wrap_err("failed to start HTTP server")?;
    server.await.wrap_err("HTTP server terminated with an error")
}
