// Subscriber directory: which clients want alerts for which vehicles

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::Subscription;
use async_trait::async_trait;
use tracing::instrument;

/// Durable store mapping a vehicle to its subscriber client identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberDirectory: Send + Sync {
    /// Client identifiers currently subscribed to `vehicle_id`.
    async fn list_subscribers(&self, vehicle_id: i64) -> Result<Vec<String>, DatabaseError>;

    /// Subscribe `client_id` to `vehicle_id`. Idempotent: repeating an
    /// existing (vehicle, client) pair returns the existing subscription.
    async fn add_subscription(
        &self,
        vehicle_id: i64,
        client_id: &str,
    ) -> Result<Subscription, DatabaseError>;

    /// Remove the matching subscription. No-op when absent.
    async fn remove_subscription(
        &self,
        vehicle_id: i64,
        client_id: &str,
    ) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed subscriber directory
pub struct PgSubscriberDirectory {
    pool: DbPool,
}

impl PgSubscriberDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberDirectory for PgSubscriberDirectory {
    #[instrument(skip(self))]
    async fn list_subscribers(&self, vehicle_id: i64) -> Result<Vec<String>, DatabaseError> {
        let client_ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT client_id FROM subscriptions
            WHERE vehicle_id = $1
            ORDER BY id
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(self.pool.pool())
        .await?;

        tracing::debug!(
            vehicle_id,
            count = client_ids.len(),
            "Resolved subscriber set"
        );
        Ok(client_ids)
    }

    #[instrument(skip(self))]
    async fn add_subscription(
        &self,
        vehicle_id: i64,
        client_id: &str,
    ) -> Result<Subscription, DatabaseError> {
        // Identity-key dedup: UNIQUE(vehicle_id, client_id) with a no-op
        // conflict update so RETURNING always yields the row.
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (vehicle_id, client_id)
            VALUES ($1, $2)
            ON CONFLICT (vehicle_id, client_id)
                DO UPDATE SET client_id = subscriptions.client_id
            RETURNING id, vehicle_id, client_id, created_at
            "#,
        )
        .bind(vehicle_id)
        .bind(client_id)
        .fetch_one(self.pool.pool())
        .await?;

        tracing::info!(
            subscription_id = subscription.id,
            vehicle_id,
            client_id,
            "Subscription created"
        );
        Ok(subscription)
    }

    #[instrument(skip(self))]
    async fn remove_subscription(
        &self,
        vehicle_id: i64,
        client_id: &str,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE vehicle_id = $1 AND client_id = $2
            "#,
        )
        .bind(vehicle_id)
        .bind(client_id)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            vehicle_id,
            client_id,
            removed = result.rows_affected(),
            "Subscription removal processed"
        );
        Ok(())
    }
}
