use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use trekka_core::repository::TripRepository;
use trekka_core::{NewTrip, StoreError, Trip};

use crate::database::backend;

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TripRow {
    id: Uuid,
    creator_id: Uuid,
    destination: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    description: Option<String>,
    is_private: bool,
    created_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            creator_id: row.creator_id,
            destination: row.destination,
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            is_private: row.is_private,
            created_at: row.created_at,
        }
    }
}

/// Shared by direct creation and pending-trip confirmation, which runs it
/// inside its own transaction.
pub(crate) async fn insert_trip<'e, E>(executor: E, trip: &NewTrip) -> Result<Trip, StoreError>
where
    E: PgExecutor<'e>,
{
    let row: TripRow = sqlx::query_as(
        r#"
        INSERT INTO trips (id, creator_id, destination, start_date, end_date, description, is_private)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, creator_id, destination, start_date, end_date, description, is_private, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(trip.creator_id)
    .bind(&trip.destination)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(&trip.description)
    .bind(trip.is_private)
    .fetch_one(executor)
    .await
    .map_err(backend)?;

    Ok(row.into())
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError> {
        insert_trip(&self.pool, trip).await
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError> {
        let row: Option<TripRow> = sqlx::query_as(
            r#"
            SELECT id, creator_id, destination, start_date, end_date, description, is_private, created_at
            FROM trips
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Trip::from))
    }
}
