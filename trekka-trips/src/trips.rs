use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use trekka_core::repository::TripRepository;
use trekka_core::{CoreError, CoreResult, NewTrip, Trip};

use crate::announce::TripAnnouncer;

/// Trip as entered by hand.
#[derive(Debug, Clone, Deserialize)]
pub struct TripDraft {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

pub struct TripService {
    trips: Arc<dyn TripRepository>,
    announcer: TripAnnouncer,
}

impl TripService {
    pub fn new(trips: Arc<dyn TripRepository>, announcer: TripAnnouncer) -> Self {
        Self { trips, announcer }
    }

    pub async fn create_trip(&self, creator: Uuid, draft: TripDraft) -> CoreResult<Trip> {
        let new_trip = NewTrip::new(
            creator,
            &draft.destination,
            draft.start_date,
            draft.end_date,
            draft.description,
            draft.is_private,
        )?;

        let trip = self.trips.create_trip(&new_trip).await?;
        info!("Trip {} created by {}", trip.id, creator);
        self.announcer.announce(&trip, false).await;
        Ok(trip)
    }

    /// Private trips are visible to their creator only.
    pub async fn get_trip(&self, viewer: Uuid, id: Uuid) -> CoreResult<Trip> {
        match self.trips.get_trip(id).await? {
            Some(trip) if !trip.is_private || trip.creator_id == viewer => Ok(trip),
            _ => Err(CoreError::NotFoundError(format!("Trip {} not found", id))),
        }
    }
}
