//! Weight entry repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use nutrition_coach_shared::{WeightEntryResponse, WeightMeasurement};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Weight entry record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WeightEntryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub weight_kg: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeightEntryRecord {
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg.to_f64().unwrap_or(0.0)
    }

    pub fn measurement(&self) -> WeightMeasurement {
        WeightMeasurement {
            date: self.entry_date,
            weight_kg: self.weight_kg(),
            note: self.note.clone(),
        }
    }
}

impl From<WeightEntryRecord> for WeightEntryResponse {
    fn from(record: WeightEntryRecord) -> Self {
        WeightEntryResponse {
            id: record.id,
            date: record.entry_date,
            weight_kg: record.weight_kg(),
            note: record.note,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Input for creating a weight entry
#[derive(Debug, Clone)]
pub struct CreateWeightEntry {
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub weight_kg: f64,
    pub note: Option<String>,
}

/// Weight repository for database operations
pub struct WeightRepository;

impl WeightRepository {
    /// Create a new weight entry
    pub async fn create<'e, E>(executor: E, input: CreateWeightEntry) -> Result<WeightEntryRecord>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, WeightEntryRecord>(
            r#"
            INSERT INTO weight_entries (user_id, entry_date, weight_kg, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, entry_date, weight_kg, note, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.entry_date)
        .bind(input.weight_kg)
        .bind(&input.note)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Get weight entries for a user, newest first, optionally bounded by date
    pub async fn list<'e, E>(
        executor: E,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<WeightEntryRecord>>
    where
        E: PgExecutor<'e>,
    {
        let records = sqlx::query_as::<_, WeightEntryRecord>(
            r#"
            SELECT id, user_id, entry_date, weight_kg, note, created_at, updated_at
            FROM weight_entries
            WHERE user_id = $1
              AND ($2::date IS NULL OR entry_date >= $2)
              AND ($3::date IS NULL OR entry_date <= $3)
            ORDER BY entry_date DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    /// Get the latest entry dated strictly before `date`
    pub async fn latest_before<'e, E>(
        executor: E,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<WeightEntryRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, WeightEntryRecord>(
            r#"
            SELECT id, user_id, entry_date, weight_kg, note, created_at, updated_at
            FROM weight_entries
            WHERE user_id = $1 AND entry_date < $2
            ORDER BY entry_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Get the most recent weight entry for a user
    pub async fn get_latest<'e, E>(executor: E, user_id: Uuid) -> Result<Option<WeightEntryRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, WeightEntryRecord>(
            r#"
            SELECT id, user_id, entry_date, weight_kg, note, created_at, updated_at
            FROM weight_entries
            WHERE user_id = $1
            ORDER BY entry_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Get weight entry by ID
    pub async fn get_by_id<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WeightEntryRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, WeightEntryRecord>(
            r#"
            SELECT id, user_id, entry_date, weight_kg, note, created_at, updated_at
            FROM weight_entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Delete a weight entry
    pub async fn delete<'e, E>(executor: E, id: Uuid, user_id: Uuid) -> Result<bool>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM weight_entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
