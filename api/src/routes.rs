use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .route(
            "/v1/subscribe-vehicle",
            post(handlers::subscriptions::subscribe_vehicle),
        )
        .route(
            "/v1/unsubscribe-vehicle",
            post(handlers::subscriptions::unsubscribe_vehicle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
