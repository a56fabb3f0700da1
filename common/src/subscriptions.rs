// Subscription service: subscribe/unsubscribe operations consumed by the API

use crate::db::repositories::{SubscriberDirectory, VehicleLedger};
use crate::errors::{SubscriptionError, ValidationError};
use crate::models::{Subscription, VehicleSubscriptionRequest};
use std::sync::Arc;
use tracing::instrument;

/// Subscribe and unsubscribe clients to watched vehicles.
///
/// Subscribing to a never-seen (manufacturer, model, year) triple creates
/// the vehicle with an empty ledger record; the next watch cycle picks it up.
pub struct SubscriptionService {
    ledger: Arc<dyn VehicleLedger>,
    directory: Arc<dyn SubscriberDirectory>,
}

impl SubscriptionService {
    pub fn new(ledger: Arc<dyn VehicleLedger>, directory: Arc<dyn SubscriberDirectory>) -> Self {
        Self { ledger, directory }
    }

    /// Subscribe a client to a vehicle, creating the vehicle if needed.
    /// Idempotent on the (client, vehicle) identity pair.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn subscribe(
        &self,
        request: &VehicleSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        validate(request)?;

        let vehicle = self.ledger.get_or_create(&request.vehicle_key()).await?;
        let subscription = self
            .directory
            .add_subscription(vehicle.id, &request.client_id)
            .await?;

        tracing::info!(
            vehicle_id = vehicle.id,
            subscription_id = subscription.id,
            "Client subscribed to vehicle"
        );
        Ok(subscription)
    }

    /// Remove a client's subscription to a vehicle. No-op when the
    /// subscription (or even the vehicle) does not exist.
    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn unsubscribe(
        &self,
        request: &VehicleSubscriptionRequest,
    ) -> Result<(), SubscriptionError> {
        validate(request)?;

        let vehicle = self.ledger.get_or_create(&request.vehicle_key()).await?;
        self.directory
            .remove_subscription(vehicle.id, &request.client_id)
            .await?;

        tracing::info!(vehicle_id = vehicle.id, "Client unsubscribed from vehicle");
        Ok(())
    }
}

fn validate(request: &VehicleSubscriptionRequest) -> Result<(), ValidationError> {
    for (field, value) in [
        ("manufacturer", &request.manufacturer),
        ("model", &request.model),
        ("year", &request.year),
        ("client_id", &request.client_id),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field.to_string()));
        }
    }
    Ok(())
}
