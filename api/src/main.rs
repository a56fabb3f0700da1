use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;

mod handlers;
mod routes;
mod state;

use common::config::Settings;
use common::db::repositories::{PgSubscriberDirectory, PgVehicleLedger};
use common::db::DbPool;
use common::subscriptions::SubscriptionService;
use common::telemetry;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Settings::load()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(&config.observability.log_level)?;
    let metrics_handle = telemetry::init_metrics()?;

    tracing::info!("Starting subscription API server");
    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        "Configuration loaded"
    );

    // Initialize database connection pool
    let db_pool = DbPool::new(&config.database).await?;
    tracing::info!("Database connection pool established");

    // Note: migrations should be run separately before starting the API

    // Subscription service over the ledger and directory
    let ledger = Arc::new(PgVehicleLedger::new(db_pool.clone()));
    let directory = Arc::new(PgSubscriberDirectory::new(db_pool.clone()));
    let subscriptions = SubscriptionService::new(ledger, directory);

    let state = AppState::new(db_pool, subscriptions, config.clone(), metrics_handle);

    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    tracing::info!(%addr, "API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}
