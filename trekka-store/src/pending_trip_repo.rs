use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use trekka_core::repository::PendingTripRepository;
use trekka_core::{NewTrip, PendingStatus, PendingTrip, StoreError, Trip, TripType};

use crate::database::backend;
use crate::trip_repo::insert_trip;

const PENDING_COLUMNS: &str = "id, user_id, destination, start_date, end_date, description, trip_type, \
     confirmation_number, email_subject, email_from, email_body, confidence_score, parsed_data, \
     status, created_at, reviewed_at";

pub struct PgPendingTripRepository {
    pool: PgPool,
}

impl PgPendingTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Called after a conditional update touched no rows: tells a missing
    /// record apart from one that was already reviewed.
    async fn lost_race(&self, owner: Uuid, id: Uuid) -> StoreError {
        let status: Result<Option<String>, _> = sqlx::query_scalar(
            "SELECT status FROM pending_trips WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await;

        match status {
            Ok(None) => StoreError::NotFound,
            Ok(Some(raw)) => match raw.parse::<PendingStatus>() {
                Ok(status) => StoreError::NotPending(status),
                Err(e) => StoreError::Backend(e),
            },
            Err(e) => backend(e),
        }
    }
}

#[derive(sqlx::FromRow)]
struct PendingTripRow {
    id: Uuid,
    user_id: Uuid,
    destination: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    description: Option<String>,
    trip_type: Option<String>,
    confirmation_number: Option<String>,
    email_subject: String,
    email_from: String,
    email_body: String,
    confidence_score: f64,
    parsed_data: Value,
    status: String,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PendingTripRow> for PendingTrip {
    type Error = StoreError;

    fn try_from(row: PendingTripRow) -> Result<Self, Self::Error> {
        Ok(PendingTrip {
            id: row.id,
            user_id: row.user_id,
            destination: row.destination,
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            trip_type: row.trip_type.as_deref().map(TripType::from_label),
            confirmation_number: row.confirmation_number,
            email_subject: row.email_subject,
            email_from: row.email_from,
            email_body: row.email_body,
            confidence_score: row.confidence_score,
            parsed_data: row.parsed_data,
            status: row.status.parse().map_err(StoreError::Backend)?,
            created_at: row.created_at,
            reviewed_at: row.reviewed_at,
        })
    }
}

#[async_trait]
impl PendingTripRepository for PgPendingTripRepository {
    async fn insert_pending_trip(&self, trip: &PendingTrip) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pending_trips (
                id, user_id, destination, start_date, end_date, description, trip_type,
                confirmation_number, email_subject, email_from, email_body, confidence_score,
                parsed_data, status, created_at, reviewed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(trip.id)
        .bind(trip.user_id)
        .bind(&trip.destination)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.description)
        .bind(trip.trip_type.map(|t| t.as_str()))
        .bind(&trip.confirmation_number)
        .bind(&trip.email_subject)
        .bind(&trip.email_from)
        .bind(&trip.email_body)
        .bind(trip.confidence_score)
        .bind(&trip.parsed_data)
        .bind(trip.status.as_str())
        .bind(trip.created_at)
        .bind(trip.reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn get_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<PendingTrip>, StoreError> {
        let row: Option<PendingTripRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pending_trips WHERE id = $1 AND user_id = $2",
            PENDING_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(PendingTrip::try_from).transpose()
    }

    async fn list_pending_trips(&self, owner: Uuid) -> Result<Vec<PendingTrip>, StoreError> {
        let rows: Vec<PendingTripRow> = sqlx::query_as(&format!(
            "SELECT {} FROM pending_trips WHERE user_id = $1 AND status = 'pending' ORDER BY created_at DESC",
            PENDING_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(PendingTrip::try_from).collect()
    }

    async fn confirm_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        trip: &NewTrip,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Trip, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let flipped = sqlx::query(
            r#"
            UPDATE pending_trips
            SET status = 'confirmed', reviewed_at = $3
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(reviewed_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await.map_err(backend)?;
            return Err(self.lost_race(owner, id).await);
        }

        // Dropping `tx` on error rolls the status flip back.
        let created = insert_trip(&mut *tx, trip).await?;
        tx.commit().await.map_err(backend)?;

        Ok(created)
    }

    async fn reject_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let flipped = sqlx::query(
            r#"
            UPDATE pending_trips
            SET status = 'rejected', reviewed_at = $3
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(reviewed_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if flipped.rows_affected() == 0 {
            return Err(self.lost_race(owner, id).await);
        }
        Ok(())
    }
}
