use std::net::SocketAddr;

use anyhow::Result;
use tracing::{error, info};

use castgate_api::http::create_router;
use castgate_core::{bootstrap, logging, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    logging::init_logging(&config.logging)?;

    info!("Castgate starting...");
    info!("HTTP address: {}", config.http_address());

    let pool = bootstrap::init_database(&config).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            anyhow::anyhow!("Migration failed: {}", e)
        })?;
    info!("Migrations completed");

    let services = bootstrap::init_services(pool.clone(), &config)?;
    let router = create_router(services);

    let listener = tokio::net::TcpListener::bind(config.http_address()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    bootstrap::close_database(pool).await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
