//! Database initialization

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::Config;

/// Initialize the database connection pool.
///
/// The pool is the only process-wide handle to the registry store; it is
/// created here once and passed to repositories explicitly, never reached
/// for as ambient global state.
///
/// Note: Migrations should be run separately by the binary crate.
pub async fn init_database(config: &Config) -> Result<PgPool> {
    info!("Connecting to database");

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_seconds))
        .connect(config.database_url())
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            anyhow::anyhow!("Database connection failed: {}", e)
        })?;

    info!("Database connected successfully");

    Ok(pool)
}

/// Drain and close the pool on shutdown
pub async fn close_database(pool: PgPool) {
    info!("Closing database pool");
    pool.close().await;
}
