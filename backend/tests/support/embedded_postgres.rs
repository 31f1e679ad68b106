//! Template-database provisioning for the Diesel adapter suites.
//!
//! The schema is migrated once into a template named after a hash of the
//! `migrations/` directory; each test clones it into a throwaway database.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use reimburse::outbound::persistence::MIGRATIONS;
use uuid::Uuid;

use super::format_postgres_error;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "reimburse_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, String> {
    let hash = hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the migrated template unless it already exists.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        migrate_schema(&url)?;
    }

    Ok(template_name)
}

fn provision_attempt(cluster: &ClusterHandle, attempt: usize) -> Result<TemporaryDatabase, String> {
    let template_name = ensure_template_database(cluster)
        .map_err(|err| format!("attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {err}"))?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| {
            format!(
                "create database from template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {err:?}"
            )
        })
}

/// Clone a fresh database from the migrated template.
pub fn provision_template_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("create database from template: exhausted retries");
    for attempt in 1..=TEMPLATE_PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = error,
        }
        if attempt < TEMPLATE_PROVISION_RETRIES {
            std::thread::sleep(TEMPLATE_PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// Apply the embedded migrations to `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Run raw SQL against `url`, outside any Diesel transaction.
pub fn execute_sql(url: &str, sql: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(sql)
        .map_err(|err| format_postgres_error(&err))
}
