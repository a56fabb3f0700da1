// Watcher binary entry point: the periodic watch-cycle loop

use anyhow::Result;
use common::alert::AlertDispatcher;
use common::config::Settings;
use common::db::repositories::{PgSubscriberDirectory, PgVehicleLedger};
use common::db::DbPool;
use common::listing::MarketplaceClient;
use common::telemetry;
use common::watcher::{WatchEngine, WatchEngineConfig, Watcher};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so logging respects the configured level
    let settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    telemetry::init_logging(&settings.observability.log_level)?;
    let _metrics_handle = telemetry::init_metrics()?;

    info!("Starting U-Watch alert producer watcher");

    info!(
        marketplace_url = %settings.marketplace.base_url,
        consumer_url = %settings.alerting.consumer_url,
        check_interval_minutes = settings.watcher.check_interval_minutes,
        "Configuration loaded"
    );

    // Initialize database connection pool
    let db_pool = DbPool::new(&settings.database).await.map_err(|e| {
        error!(error = %e, "Failed to initialize database pool");
        anyhow::anyhow!("Database initialization error: {}", e)
    })?;
    info!("Database connection pool initialized");

    // Note: migrations should be run separately before starting the watcher

    // Wire collaborators
    let ledger = Arc::new(PgVehicleLedger::new(db_pool.clone()));
    let directory = Arc::new(PgSubscriberDirectory::new(db_pool.clone()));
    let source = Arc::new(
        MarketplaceClient::new(&settings.marketplace)
            .map_err(|e| anyhow::anyhow!("Marketplace client error: {}", e))?,
    );
    let dispatcher = Arc::new(
        AlertDispatcher::new(&settings.alerting, directory)
            .map_err(|e| anyhow::anyhow!("Dispatcher error: {}", e))?,
    );
    info!("Collaborators initialized");

    let engine_config = WatchEngineConfig {
        check_interval_minutes: settings.watcher.check_interval_minutes,
        max_concurrent_checks: settings.watcher.max_concurrent_checks,
    };

    let engine = Arc::new(WatchEngine::new(engine_config, ledger, source, dispatcher));
    info!("Watch engine created");

    // Graceful shutdown on Ctrl+C
    let engine_for_shutdown = engine.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        info!("Received Ctrl+C signal, initiating graceful shutdown");
        if let Err(e) = engine_for_shutdown.stop().await {
            error!(error = %e, "Error during watch engine shutdown");
        }
    });

    info!("Starting watch loop");
    if let Err(e) = engine.start().await {
        error!(error = %e, "Watch engine error");
        return Err(anyhow::anyhow!("Watch engine error: {}", e));
    }

    db_pool.close().await;
    info!("Watcher stopped");
    Ok(())
}
