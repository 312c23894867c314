use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pending::{PendingStatus, PendingTrip};
use crate::profile::Profile;
use crate::trip::{NewTrip, Trip};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// Compare-and-set on `status = 'pending'` lost.
    #[error("pending trip is already {0}")]
    NotPending(PendingStatus),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Repository trait for imported trip drafts.
///
/// Every read and write is scoped by `owner`; a record owned by someone else
/// behaves exactly like a missing one.
#[async_trait]
pub trait PendingTripRepository: Send + Sync {
    async fn insert_pending_trip(&self, trip: &PendingTrip) -> Result<(), StoreError>;

    async fn get_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<PendingTrip>, StoreError>;

    /// Records still in `pending`, newest first.
    async fn list_pending_trips(&self, owner: Uuid) -> Result<Vec<PendingTrip>, StoreError>;

    /// Flips `pending → confirmed` and inserts `trip` as one unit.
    /// Either both happen or neither does.
    async fn confirm_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        trip: &NewTrip,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Trip, StoreError>;

    /// Flips `pending → rejected`, conditioned on the current status.
    async fn reject_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Repository trait for published trips
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError>;

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError>;
}

/// Read-only view of the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `token` is the lower-cased local part of an import address.
    async fn find_by_import_token(&self, token: &str) -> Result<Option<Uuid>, StoreError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
}
