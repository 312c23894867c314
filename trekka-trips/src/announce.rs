use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use trekka_core::repository::UserDirectory;
use trekka_core::{Notifier, Trip};
use trekka_shared::{Notification, TripAddedEvent};

/// Tells the creator's followers about a newly published trip.
#[derive(Clone)]
pub struct TripAnnouncer {
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl TripAnnouncer {
    pub fn new(directory: Arc<dyn UserDirectory>, notifier: Arc<dyn Notifier>) -> Self {
        Self { directory, notifier }
    }

    /// Never fails; private trips are skipped.
    pub async fn announce(&self, trip: &Trip, imported: bool) {
        if trip.is_private {
            debug!("Trip {} is private, not announcing", trip.id);
            return;
        }

        let profile = match self.directory.get_profile(trip.creator_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Could not load profile {} for announcement: {}", trip.creator_id, e);
                None
            }
        };

        let event = TripAddedEvent {
            trip_id: trip.id,
            creator_id: trip.creator_id,
            creator_username: profile.as_ref().map(|p| p.username.clone()),
            creator_display_name: profile.and_then(|p| p.display_name),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            imported,
            timestamp: Utc::now().timestamp(),
        };

        if let Err(e) = self.notifier.notify(Notification::TripAdded(event)).await {
            warn!("Trip {} saved but announcement failed: {}", trip.id, e);
        }
    }
}
