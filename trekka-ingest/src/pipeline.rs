use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use trekka_core::repository::{PendingTripRepository, UserDirectory};
use trekka_core::{CoreError, CoreResult, EmailProvenance, Notifier, PendingTrip, TripCandidate};
use trekka_shared::{Masked, Notification, PendingTripCreatedEvent};

use crate::email::{truncate_chars, InboundEmail};
use crate::extractor::TripExtractor;

pub const DEFAULT_STORED_BODY_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub pending_trip: PendingTrip,
    pub candidate: TripCandidate,
}

/// Turns a forwarded booking email into a pending trip for the recipient.
pub struct Ingestor {
    directory: Arc<dyn UserDirectory>,
    pending: Arc<dyn PendingTripRepository>,
    extractor: Arc<dyn TripExtractor>,
    notifier: Arc<dyn Notifier>,
    stored_body_limit: usize,
}

impl Ingestor {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        pending: Arc<dyn PendingTripRepository>,
        extractor: Arc<dyn TripExtractor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            pending,
            extractor,
            notifier,
            stored_body_limit: DEFAULT_STORED_BODY_LIMIT,
        }
    }

    pub fn with_stored_body_limit(mut self, limit: usize) -> Self {
        self.stored_body_limit = limit;
        self
    }

    /// Nothing is persisted unless extraction succeeds.
    pub async fn ingest(&self, email: &InboundEmail) -> CoreResult<IngestOutcome> {
        let (Some(_), Some(subject), Some(body)) = (email.to(), email.subject(), email.body()) else {
            return Err(CoreError::ValidationError("Invalid email data".to_string()));
        };
        let token = email
            .import_token()
            .ok_or_else(|| CoreError::ValidationError("Invalid recipient address".to_string()))?;

        let sender = Masked(email.from().to_string());
        info!("Received email for import id {} from {}", token, sender.redacted_email());

        let user_id = self.directory.find_by_import_token(&token).await?.ok_or_else(|| {
            warn!("No user for import id {}", token);
            CoreError::NotFoundError("User not found".to_string())
        })?;

        let candidate = self.extractor.extract(subject, body).await.map_err(|e| {
            error!("Failed to extract trip for user {}: {}", user_id, e);
            CoreError::from(e)
        })?;

        let provenance = EmailProvenance {
            subject: subject.to_string(),
            from: email.from().to_string(),
            body: truncate_chars(body, self.stored_body_limit).to_string(),
        };
        let pending_trip = PendingTrip::new(user_id, &candidate, provenance);

        self.pending.insert_pending_trip(&pending_trip).await.map_err(|e| {
            error!("Failed to create pending trip for user {}: {}", user_id, e);
            CoreError::DependencyError("Failed to create pending trip".to_string())
        })?;

        info!(
            "Created pending trip {} (destination {:?}, confidence {:.2})",
            pending_trip.id, pending_trip.destination, pending_trip.confidence_score
        );

        let notification = Notification::PendingTripCreated(PendingTripCreatedEvent {
            pending_trip_id: pending_trip.id,
            user_id,
            destination: pending_trip.destination.clone(),
            confidence_score: pending_trip.confidence_score,
            timestamp: Utc::now().timestamp(),
        });
        if let Err(e) = self.notifier.notify(notification).await {
            warn!("Pending trip {} created but notification failed: {}", pending_trip.id, e);
        }

        Ok(IngestOutcome { pending_trip, candidate })
    }
}
