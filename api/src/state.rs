use std::sync::Arc;

use common::config::Settings;
use common::db::DbPool;
use common::subscriptions::SubscriptionService;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub subscriptions: Arc<SubscriptionService>,
    pub config: Arc<Settings>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(
        db_pool: DbPool,
        subscriptions: SubscriptionService,
        config: Settings,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            db_pool,
            subscriptions: Arc::new(subscriptions),
            config: Arc::new(config),
            metrics_handle,
        }
    }
}
