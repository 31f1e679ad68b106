//! Process-wide embedded PostgreSQL cluster for integration tests.
//!
//! `pg-embed-setup-unpriv` keeps one cluster alive for the whole test binary.
//! Bootstrapping downloads binaries on first use, so transient failures are
//! retried a few times before the suite gives up.

use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);
const STABLE_PASSWORD: &str = "reimburse_embedded_test";

/// Return the shared cluster, starting it on first call.
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) => {
                if attempt >= SHARED_CLUSTER_RETRIES {
                    return Err(error);
                }
                eprintln!(
                    "pg-embed: shared cluster attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed, retrying"
                );
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Pin `PG_PASSWORD` so a reused data directory keeps accepting logins.
///
/// A fresh random password on each run would not match the one `initdb`
/// recorded the first time the directory was created.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library spawns threads; the shared
        // cluster singleton serialises bootstrap.
        unsafe {
            std::env::set_var("PG_PASSWORD", STABLE_PASSWORD);
        }
    }
}
