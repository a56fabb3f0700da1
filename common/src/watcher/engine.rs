// Watch-cycle engine: per tick, check every watched vehicle for a novel
// listing and fan alerts out to its subscribers

use crate::alert::{is_novel_listing, AlertDispatcher};
use crate::db::repositories::VehicleLedger;
use crate::errors::DatabaseError;
use crate::listing::ListingSource;
use crate::models::Vehicle;
use crate::telemetry;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the watch engine
#[derive(Debug, Clone)]
pub struct WatchEngineConfig {
    /// Minutes between watch cycles.
    pub check_interval_minutes: u64,
    /// Cap on concurrently processed vehicles within a cycle.
    pub max_concurrent_checks: usize,
}

impl Default for WatchEngineConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: 30,
            max_concurrent_checks: 16,
        }
    }
}

/// Watcher trait for watch-cycle operations
#[async_trait]
pub trait Watcher: Send + Sync {
    /// Start the periodic watch loop
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Stop the watch loop gracefully
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Run one full watch cycle, returning the number of vehicles that
    /// produced an alert
    async fn run_cycle(&self) -> Result<usize, DatabaseError>;
}

/// Main watch engine implementation
pub struct WatchEngine {
    config: WatchEngineConfig,
    ledger: Arc<dyn VehicleLedger>,
    source: Arc<dyn ListingSource>,
    dispatcher: Arc<AlertDispatcher>,
    shutdown_tx: tokio::sync::broadcast::Sender<()>,
}

impl WatchEngine {
    pub fn new(
        config: WatchEngineConfig,
        ledger: Arc<dyn VehicleLedger>,
        source: Arc<dyn ListingSource>,
        dispatcher: Arc<AlertDispatcher>,
    ) -> Self {
        let (shutdown_tx, _shutdown_rx) = tokio::sync::broadcast::channel(1);

        Self {
            config,
            ledger,
            source,
            dispatcher,
            shutdown_tx,
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> tokio::sync::broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Check one vehicle: fetch the latest listing, decide novelty, claim
    /// the identity in the ledger, and dispatch on a won claim.
    ///
    /// Returns `true` if an alert was dispatched. Every failure path skips
    /// the vehicle for this cycle; the next tick retries naturally.
    #[instrument(skip(self, vehicle), fields(vehicle_id = vehicle.id, vehicle = %vehicle.key()))]
    async fn check_vehicle(&self, vehicle: &Vehicle) -> bool {
        let listing = match self.source.latest_listing(&vehicle.key()).await {
            Ok(Some(listing)) => listing,
            Ok(None) => {
                debug!("No listings found for vehicle");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch latest listing, skipping vehicle this cycle");
                metrics::counter!("listing_fetch_failures_total").increment(1);
                return false;
            }
        };

        metrics::counter!("listings_fetched_total").increment(1);

        let today = Utc::now().date_naive();
        if !is_novel_listing(vehicle, &listing, today) {
            debug!(
                row_id = %listing.row_id,
                branch = %listing.branch,
                "Latest listing already alerted on"
            );
            return false;
        }

        // Claim before dispatch: the ledger write is the authority on
        // "already alerted". An overlapping cycle that read the same stale
        // state loses the compare-and-swap and must not send, so one listing
        // identity can never be alerted twice.
        let claimed = match self
            .ledger
            .claim_listing(
                vehicle.id,
                vehicle.last_listing_identity(),
                listing.identity(),
            )
            .await
        {
            Ok(claimed) => claimed,
            Err(e) => {
                // Loud: the alert for this listing is suppressed until the
                // next distinct listing appears.
                error!(
                    error = %e,
                    row_id = %listing.row_id,
                    branch = %listing.branch,
                    "Ledger update failed; alert suppressed for this listing"
                );
                return false;
            }
        };

        if !claimed {
            debug!("Another cycle already claimed this listing");
            return false;
        }

        metrics::counter!("novel_listings_total").increment(1);
        info!(
            row_id = %listing.row_id,
            branch = %listing.branch,
            date_listed = %listing.date_listed,
            "Novel listing found, dispatching alerts"
        );

        let delivered = self.dispatcher.dispatch(&listing, vehicle).await;
        info!(delivered, "Dispatch complete");

        true
    }
}

#[async_trait]
impl Watcher for WatchEngine {
    /// Start the periodic watch loop.
    ///
    /// Cycles run inline in the loop, so a cycle slower than the interval
    /// coalesces the missed ticks instead of overlapping with itself; the
    /// ledger compare-and-swap covers anything the loop cannot see (e.g. a
    /// second watcher process).
    #[instrument(skip(self))]
    async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            check_interval_minutes = self.config.check_interval_minutes,
            max_concurrent_checks = self.config.max_concurrent_checks,
            "Starting watch engine"
        );

        let mut tick = interval(Duration::from_secs(self.config.check_interval_minutes * 60));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut shutdown_rx = self.shutdown_receiver();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    debug!("Watch tick");

                    let started = tokio::time::Instant::now();
                    match self.run_cycle().await {
                        Ok(alerted) => {
                            telemetry::record_cycle(started.elapsed().as_secs_f64());
                            if alerted > 0 {
                                info!(vehicles_alerted = alerted, "Watch cycle complete");
                            } else {
                                debug!("Watch cycle complete, nothing novel");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Watch cycle aborted");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping watch engine");
                    break;
                }
            }
        }

        info!("Watch engine stopped");
        Ok(())
    }

    /// Stop the watch loop gracefully
    #[instrument(skip(self))]
    async fn stop(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Stopping watch engine");
        let _ = self.shutdown_tx.send(());
        Ok(())
    }

    /// Run one full watch cycle.
    ///
    /// A ledger load failure aborts the cycle cleanly; per-vehicle failures
    /// only skip that vehicle. Vehicles are processed concurrently up to
    /// `max_concurrent_checks` in flight.
    #[instrument(skip(self))]
    async fn run_cycle(&self) -> Result<usize, DatabaseError> {
        let vehicles = match self.ledger.list_watched().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!(error = %e, "Failed to load watched vehicles, aborting cycle");
                return Err(e);
            }
        };

        debug!(vehicle_count = vehicles.len(), "Checking watched vehicles");

        let alerted = futures::stream::iter(vehicles)
            .map(|vehicle| async move { self.check_vehicle(&vehicle).await })
            .buffer_unordered(self.config.max_concurrent_checks)
            .filter(|alerted| futures::future::ready(*alerted))
            .count()
            .await;

        Ok(alerted)
    }
}
