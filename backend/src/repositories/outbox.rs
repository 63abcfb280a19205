//! Transactional outbox
//!
//! Events are inserted with the state change they describe; publishing them
//! is left to a relay reading unpublished rows.

use anyhow::Result;
use nutrition_coach_shared::NutritionEvent;
use sqlx::types::Json;
use sqlx::PgExecutor;

pub struct OutboxRepository;

impl OutboxRepository {
    /// Append an event, returning its sequence number
    pub async fn append<'e, E>(executor: E, event: &NutritionEvent) -> Result<i64>
    where
        E: PgExecutor<'e>,
    {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO outbox_events (user_id, event_type, payload)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(event.user_id())
        .bind(event.event_type())
        .bind(Json(event))
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Number of events not yet picked up by the relay
    pub async fn pending_count<'e, E>(executor: E) -> Result<i64>
    where
        E: PgExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM outbox_events WHERE published_at IS NULL
            "#,
        )
        .fetch_one(executor)
        .await?;

        Ok(count)
    }
}
