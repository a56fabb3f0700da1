use axum::{extract::State, http::StatusCode, Json};

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{Subscription, VehicleSubscriptionRequest};

/// Subscribe a client to new-listing alerts for a vehicle
#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id))]
pub async fn subscribe_vehicle(
    State(state): State<AppState>,
    Json(req): Json<VehicleSubscriptionRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<Subscription>>), ErrorResponse> {
    let subscription = state.subscriptions.subscribe(&req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(subscription)),
    ))
}

/// Unsubscribe a client from a vehicle's alerts
#[tracing::instrument(skip(state, req), fields(client_id = %req.client_id))]
pub async fn unsubscribe_vehicle(
    State(state): State<AppState>,
    Json(req): Json<VehicleSubscriptionRequest>,
) -> Result<SuccessResponse<serde_json::Value>, ErrorResponse> {
    state.subscriptions.unsubscribe(&req).await?;

    Ok(SuccessResponse::new(
        serde_json::json!({"unsubscribed": true}),
    ))
}
