// Vehicle ledger: watched vehicles and the identity of the last listing
// alerted on per vehicle

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Vehicle, VehicleKey};
use async_trait::async_trait;
use tracing::instrument;

/// Durable store of watched vehicles.
///
/// The ledger is the only mutable shared state in the system; everything
/// that touches it goes through this trait so the watch engine can be tested
/// against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleLedger: Send + Sync {
    /// All vehicles currently being watched.
    async fn list_watched(&self) -> Result<Vec<Vehicle>, DatabaseError>;

    /// Fetch the vehicle for `key`, creating it with an empty ledger record
    /// if this is the first subscription request for the triple.
    async fn get_or_create(&self, key: &VehicleKey) -> Result<Vehicle, DatabaseError>;

    /// Atomically record that `new` has been alerted on, but only if the
    /// ledger still holds `previous`. Returns `true` if this caller won the
    /// claim; `false` means another cycle already alerted for a newer
    /// identity and the caller must not dispatch.
    async fn claim_listing<'a>(
        &self,
        vehicle_id: i64,
        previous: Option<(&'a str, &'a str)>,
        new: (&'a str, &'a str),
    ) -> Result<bool, DatabaseError>;
}

/// PostgreSQL-backed vehicle ledger
pub struct PgVehicleLedger {
    pool: DbPool,
}

impl PgVehicleLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleLedger for PgVehicleLedger {
    #[instrument(skip(self))]
    async fn list_watched(&self) -> Result<Vec<Vehicle>, DatabaseError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, manufacturer, model, year, last_row_id, last_branch,
                   created_at, updated_at
            FROM vehicles
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        tracing::debug!(count = vehicles.len(), "Loaded watched vehicles");
        Ok(vehicles)
    }

    #[instrument(skip(self), fields(vehicle = %key))]
    async fn get_or_create(&self, key: &VehicleKey) -> Result<Vehicle, DatabaseError> {
        // Upsert keyed on the identity triple. DO UPDATE on conflict so the
        // RETURNING clause yields the existing row instead of nothing.
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (manufacturer, model, year)
            VALUES ($1, $2, $3)
            ON CONFLICT (manufacturer, model, year)
                DO UPDATE SET updated_at = vehicles.updated_at
            RETURNING id, manufacturer, model, year, last_row_id, last_branch,
                      created_at, updated_at
            "#,
        )
        .bind(&key.manufacturer)
        .bind(&key.model)
        .bind(&key.year)
        .fetch_one(self.pool.pool())
        .await?;

        tracing::debug!(vehicle_id = vehicle.id, "Vehicle resolved");
        Ok(vehicle)
    }

    #[instrument(skip(self))]
    async fn claim_listing<'a>(
        &self,
        vehicle_id: i64,
        previous: Option<(&'a str, &'a str)>,
        new: (&'a str, &'a str),
    ) -> Result<bool, DatabaseError> {
        let (prev_row, prev_branch) = match previous {
            Some((row, branch)) => (Some(row), Some(branch)),
            None => (None, None),
        };

        // Compare-and-swap on the remembered identity pair. Both columns are
        // written in one statement so the pair can never be half-set. An
        // overlapping cycle that read the same stale state loses here and
        // must not dispatch.
        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET last_row_id = $2, last_branch = $3, updated_at = now()
            WHERE id = $1
              AND last_row_id IS NOT DISTINCT FROM $4
              AND last_branch IS NOT DISTINCT FROM $5
            "#,
        )
        .bind(vehicle_id)
        .bind(new.0)
        .bind(new.1)
        .bind(prev_row)
        .bind(prev_branch)
        .execute(self.pool.pool())
        .await?;

        let won = result.rows_affected() == 1;
        if won {
            tracing::info!(
                vehicle_id,
                row_id = new.0,
                branch = new.1,
                "Ledger updated with new listing identity"
            );
        } else {
            tracing::warn!(
                vehicle_id,
                row_id = new.0,
                branch = new.1,
                "Listing claim lost; ledger was updated concurrently"
            );
        }

        Ok(won)
    }
}
