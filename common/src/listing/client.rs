// HTTP client for the marketplace inventory API

use crate::config::MarketplaceConfig;
use crate::errors::FetchError;
use crate::listing::ListingSource;
use crate::models::{Listing, VehicleKey};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

/// Marketplace inventory client.
///
/// Queries `{base_url}/inventory` with the vehicle key; the endpoint returns
/// listings ordered newest-first, so the latest listing is the first element.
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
}

impl MarketplaceClient {
    pub fn new(config: &MarketplaceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                FetchError::RequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ListingSource for MarketplaceClient {
    #[instrument(skip(self), fields(vehicle = %key))]
    async fn latest_listing(&self, key: &VehicleKey) -> Result<Option<Listing>, FetchError> {
        let url = format!("{}/inventory", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("make", key.manufacturer.as_str()),
                ("model", key.model.as_str()),
                ("year", key.year.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let listings: Vec<Listing> = response
            .json()
            .await
            .map_err(|e| FetchError::DecodeFailed(e.to_string()))?;

        tracing::debug!(count = listings.len(), "Fetched inventory listings");

        Ok(listings.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> MarketplaceConfig {
        MarketplaceConfig {
            base_url: base_url.to_string(),
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = MarketplaceClient::new(&config("https://example.com/api/")).unwrap();
        assert_eq!(client.base_url, "https://example.com/api");
    }
}
