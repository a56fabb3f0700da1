// Marketplace listing source

mod client;

pub use client::MarketplaceClient;

use crate::errors::FetchError;
use crate::models::{Listing, VehicleKey};
use async_trait::async_trait;

/// Lookup of the single most-recent marketplace listing for a vehicle.
///
/// The marketplace is an external collaborator; the core only ever asks one
/// question of it. `None` means the marketplace currently has no inventory
/// for the key, which is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn latest_listing(&self, key: &VehicleKey) -> Result<Option<Listing>, FetchError>;
}
