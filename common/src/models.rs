use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Vehicle Models
// ============================================================================

/// The identity of a watched vehicle: manufacturer, model and model year.
///
/// Year is kept as an opaque string because the marketplace treats it as one
/// (e.g. "1996" but also ranges like "1996-1998" for some makes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleKey {
    pub manufacturer: String,
    pub model: String,
    pub year: String,
}

impl VehicleKey {
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            year: year.into(),
        }
    }
}

impl std::fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.manufacturer, self.model, self.year)
    }
}

/// A watched vehicle with its remembered "last alerted listing" identity.
///
/// `last_row_id` and `last_branch` together name one remembered listing.
/// They are either both set or both unset; every write updates the pair in a
/// single statement so a partial record can never be observed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub manufacturer: String,
    pub model: String,
    pub year: String,
    pub last_row_id: Option<String>,
    pub last_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn key(&self) -> VehicleKey {
        VehicleKey::new(&self.manufacturer, &self.model, &self.year)
    }

    /// The (row_id, branch) identity of the last listing alerted on, or
    /// `None` if this vehicle has never produced an alert.
    pub fn last_listing_identity(&self) -> Option<(&str, &str)> {
        match (self.last_row_id.as_deref(), self.last_branch.as_deref()) {
            (Some(row), Some(branch)) => Some((row, branch)),
            _ => None,
        }
    }
}

// ============================================================================
// Listing Models
// ============================================================================

/// A marketplace inventory listing as returned by the listing source.
///
/// Listings are immutable snapshots; the core reads them and never persists
/// them. Identity is the (row_id, branch) pair: the same row id at two
/// branches is two distinct postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub row_id: String,
    pub branch: String,
    pub year: String,
    pub make: String,
    pub model: String,
    pub date_listed: NaiveDate,
    pub listing_url: String,
}

impl Listing {
    pub fn identity(&self) -> (&str, &str) {
        (&self.row_id, &self.branch)
    }
}

// ============================================================================
// Subscription Models
// ============================================================================

/// A client's subscription to alerts for one vehicle.
///
/// Unique on (vehicle_id, client_id): a client may subscribe to a given
/// vehicle at most once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub vehicle_id: i64,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
}

/// Inbound subscribe/unsubscribe request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSubscriptionRequest {
    pub manufacturer: String,
    pub model: String,
    pub year: String,
    pub client_id: String,
}

impl VehicleSubscriptionRequest {
    pub fn vehicle_key(&self) -> VehicleKey {
        VehicleKey::new(&self.manufacturer, &self.model, &self.year)
    }
}

// ============================================================================
// Alert Models
// ============================================================================

/// The notification body sent to the alert consumer, one per delivery.
///
/// Constructed fresh per subscriber and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub year: String,
    pub make: String,
    pub model: String,
    pub date_listed: NaiveDate,
    pub row_id: String,
    pub branch: String,
    pub listing_url: String,
    pub client_id: String,
}

impl AlertPayload {
    pub fn new(listing: &Listing, client_id: impl Into<String>) -> Self {
        Self {
            year: listing.year.clone(),
            make: listing.make.clone(),
            model: listing.model.clone(),
            date_listed: listing.date_listed,
            row_id: listing.row_id.clone(),
            branch: listing.branch.clone(),
            listing_url: listing.listing_url.clone(),
            client_id: client_id.into(),
        }
    }
}
