// Notification dispatcher: fans a novel listing out to every subscriber

use crate::config::AlertingConfig;
use crate::db::repositories::SubscriberDirectory;
use crate::errors::DeliveryError;
use crate::models::{AlertPayload, Listing, Vehicle};
use crate::telemetry;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Delivers one alert per subscriber of a vehicle to the configured
/// alert-consumer webhook.
///
/// Deliveries run concurrently and independently: a failed delivery is
/// logged and dropped without affecting sibling deliveries or the caller.
/// There is no retry queue; the consumer either accepts with 204 or the
/// alert is lost for this listing.
pub struct AlertDispatcher {
    client: Client,
    consumer_url: String,
    directory: Arc<dyn SubscriberDirectory>,
}

impl AlertDispatcher {
    pub fn new(
        config: &AlertingConfig,
        directory: Arc<dyn SubscriberDirectory>,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.delivery_timeout_seconds))
            .build()
            .map_err(|e| {
                DeliveryError::RequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            consumer_url: config.consumer_url.clone(),
            directory,
        })
    }

    /// Fan `listing` out to every current subscriber of `vehicle`.
    ///
    /// The subscriber set is resolved once, at dispatch time; a subscriber
    /// added afterwards does not receive this alert. Returns the number of
    /// accepted deliveries, which callers only log.
    #[instrument(skip(self, listing, vehicle), fields(
        vehicle_id = vehicle.id,
        row_id = %listing.row_id,
        branch = %listing.branch
    ))]
    pub async fn dispatch(&self, listing: &Listing, vehicle: &Vehicle) -> usize {
        let subscribers = match self.directory.list_subscribers(vehicle.id).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                // Not an error for the cycle: zero deliveries and move on.
                tracing::warn!(error = %e, "Failed to resolve subscriber set, skipping dispatch");
                return 0;
            }
        };

        if subscribers.is_empty() {
            tracing::debug!("No subscribers for vehicle, nothing to deliver");
            return 0;
        }

        tracing::info!(
            subscriber_count = subscribers.len(),
            "Dispatching alert to subscribers"
        );

        let deliveries = subscribers.iter().map(|client_id| {
            let payload = AlertPayload::new(listing, client_id.clone());
            async move {
                match self.deliver(&payload).await {
                    Ok(()) => {
                        tracing::info!(client_id = %payload.client_id, "Alert accepted by consumer");
                        telemetry::record_alert_delivered(&payload.client_id);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            client_id = %payload.client_id,
                            error = %e,
                            "Alert delivery failed"
                        );
                        telemetry::record_alert_failure(&payload.client_id, delivery_reason(&e));
                        false
                    }
                }
            }
        });

        join_all(deliveries)
            .await
            .into_iter()
            .filter(|delivered| *delivered)
            .count()
    }

    /// Deliver one payload to the alert consumer. Success is exactly a
    /// 204 No Content response.
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.consumer_url)
            .json(payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(DeliveryError::UnexpectedStatus(status.as_u16())),
        }
    }
}

fn delivery_reason(err: &DeliveryError) -> &'static str {
    match err {
        DeliveryError::RequestFailed(_) => "transport",
        DeliveryError::UnexpectedStatus(_) => "status",
    }
}
