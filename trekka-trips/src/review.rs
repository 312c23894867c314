use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use trekka_core::repository::PendingTripRepository;
use trekka_core::{CoreError, CoreResult, NewTrip, PendingTrip, ReviewDecision, Trip};

use crate::announce::TripAnnouncer;

/// Owner's corrections applied on confirmation. Absent or blank values keep
/// what was extracted from the email.
#[derive(Debug, Clone, Default)]
pub struct ConfirmEdits {
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
}

impl ConfirmEdits {
    fn apply(self, pending: &PendingTrip) -> CoreResult<NewTrip> {
        let destination = non_blank(self.destination).unwrap_or_else(|| pending.destination.clone());
        let description = non_blank(self.description).or_else(|| pending.description.clone());

        NewTrip::new(
            pending.user_id,
            &destination,
            self.start_date.or(pending.start_date),
            self.end_date.or(pending.end_date),
            description,
            self.is_private.unwrap_or(false),
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Review queue for imported trips: list, inspect, confirm or reject.
pub struct PendingTripManager {
    pending: Arc<dyn PendingTripRepository>,
    announcer: TripAnnouncer,
}

impl PendingTripManager {
    pub fn new(pending: Arc<dyn PendingTripRepository>, announcer: TripAnnouncer) -> Self {
        Self { pending, announcer }
    }

    /// Records still awaiting review, newest first.
    pub async fn list_pending(&self, owner: Uuid) -> CoreResult<Vec<PendingTrip>> {
        Ok(self.pending.list_pending_trips(owner).await?)
    }

    pub async fn get_pending(&self, owner: Uuid, id: Uuid) -> CoreResult<PendingTrip> {
        self.pending
            .get_pending_trip(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Pending trip {} not found", id)))
    }

    /// Transition: Pending → Confirmed, publishing the trip in the same unit.
    pub async fn confirm(&self, owner: Uuid, id: Uuid, edits: ConfirmEdits) -> CoreResult<Trip> {
        let pending = self.get_pending(owner, id).await?;
        pending.status.review(ReviewDecision::Confirm)?;

        let new_trip = edits.apply(&pending)?;
        let trip = self
            .pending
            .confirm_pending_trip(owner, id, &new_trip, Utc::now())
            .await?;

        info!("Pending trip {} confirmed as trip {}", id, trip.id);
        self.announcer.announce(&trip, true).await;
        Ok(trip)
    }

    /// Transition: Pending → Rejected. No trip is created.
    pub async fn reject(&self, owner: Uuid, id: Uuid) -> CoreResult<()> {
        let pending = self.get_pending(owner, id).await?;
        pending.status.review(ReviewDecision::Reject)?;

        self.pending.reject_pending_trip(owner, id, Utc::now()).await?;
        info!("Pending trip {} rejected", id);
        Ok(())
    }
}
