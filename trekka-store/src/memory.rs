use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use trekka_core::repository::{PendingTripRepository, TripRepository, UserDirectory};
use trekka_core::{NewTrip, PendingStatus, PendingTrip, Profile, StoreError, Trip};

#[derive(Default)]
struct Tables {
    pending: Vec<PendingTrip>,
    trips: Vec<Trip>,
    profiles: Vec<Profile>,
}

/// Process-local implementation of every storage trait.
///
/// One lock guards all tables, so confirmation (status flip plus trip insert)
/// is atomic the same way the Postgres transaction is.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_trip_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_profile(&self, profile: Profile) {
        let mut tables = self.tables.write().await;
        tables.profiles.retain(|p| p.id != profile.id);
        tables.profiles.push(profile);
    }

    pub async fn trips_by(&self, creator_id: Uuid) -> Vec<Trip> {
        let tables = self.tables.read().await;
        tables.trips.iter().filter(|t| t.creator_id == creator_id).cloned().collect()
    }

    /// Makes every trip write fail with a backend error until switched off.
    pub fn fail_trip_writes(&self, fail: bool) {
        self.fail_trip_writes.store(fail, Ordering::SeqCst);
    }

    fn check_trip_write(&self) -> Result<(), StoreError> {
        if self.fail_trip_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("trip write failed".to_string()));
        }
        Ok(())
    }

    fn position(tables: &Tables, owner: Uuid, id: Uuid) -> Result<usize, StoreError> {
        tables
            .pending
            .iter()
            .position(|p| p.id == id && p.user_id == owner)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PendingTripRepository for MemoryStore {
    async fn insert_pending_trip(&self, trip: &PendingTrip) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.pending.iter().any(|p| p.id == trip.id) {
            return Err(StoreError::Backend(format!("duplicate pending trip {}", trip.id)));
        }
        tables.pending.push(trip.clone());
        Ok(())
    }

    async fn get_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<PendingTrip>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.pending.iter().find(|p| p.id == id && p.user_id == owner).cloned())
    }

    async fn list_pending_trips(&self, owner: Uuid) -> Result<Vec<PendingTrip>, StoreError> {
        let tables = self.tables.read().await;
        let mut queue: Vec<PendingTrip> = tables
            .pending
            .iter()
            .filter(|p| p.user_id == owner && p.status == PendingStatus::Pending)
            .cloned()
            .collect();
        queue.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(queue)
    }

    async fn confirm_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        trip: &NewTrip,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Trip, StoreError> {
        let mut tables = self.tables.write().await;
        let idx = Self::position(&tables, owner, id)?;

        let status = tables.pending[idx].status;
        if status != PendingStatus::Pending {
            return Err(StoreError::NotPending(status));
        }
        self.check_trip_write()?;

        let created = trip.clone().into_trip();
        tables.trips.push(created.clone());
        let pending = &mut tables.pending[idx];
        pending.status = PendingStatus::Confirmed;
        pending.reviewed_at = Some(reviewed_at);

        Ok(created)
    }

    async fn reject_pending_trip(
        &self,
        owner: Uuid,
        id: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let idx = Self::position(&tables, owner, id)?;

        let pending = &mut tables.pending[idx];
        if pending.status != PendingStatus::Pending {
            return Err(StoreError::NotPending(pending.status));
        }
        pending.status = PendingStatus::Rejected;
        pending.reviewed_at = Some(reviewed_at);
        Ok(())
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError> {
        self.check_trip_write()?;
        let created = trip.clone().into_trip();
        self.tables.write().await.trips.push(created.clone());
        Ok(created)
    }

    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.trips.iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_import_token(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.email_import_id.eq_ignore_ascii_case(token))
            .map(|p| p.id))
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == user_id).cloned())
    }
}
