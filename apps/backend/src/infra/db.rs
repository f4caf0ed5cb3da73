use std::future::Future;
use std::time::Duration;

use migration::migrate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

/// Retries `connect_fn` at a fixed interval and returns the last error once
/// attempts run out.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection_retry_succeeded");
                }
                return Ok(conn);
            }
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "connection_retry_failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn connect_options(kind: DbKind, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(10));

    match kind {
        // Every pooled connection to `sqlite::memory:` is its own database,
        // so the pool is pinned to exactly one.
        DbKind::SqliteMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::SqliteFile => {
            opts.max_connections(4).min_connections(1);
        }
        DbKind::Postgres => {
            opts.max_connections(20).min_connections(2);
        }
    }
    opts
}

/// Opens a pool for `kind`. Does not run migrations.
pub async fn connect_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    let opts = connect_options(kind, url);
    retry_connection(
        || {
            let opts = opts.clone();
            async move { Database::connect(opts).await.map_err(AppError::from) }
        },
        CONNECT_ATTEMPTS,
        CONNECT_RETRY_INTERVAL_MS,
    )
    .await
}

/// Connects and brings the schema up to date.
pub async fn bootstrap_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(kind).await?;
    migrate(&conn)
        .await
        .map_err(|e| AppError::config(format!("migration failed: {e}")))?;
    info!(engine = kind.engine(), "database_ready");
    Ok(conn)
}
