use chrono::NaiveDate;
use uuid::Uuid;

/// A public trip was published, either directly or by confirming an imported one.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct TripAddedEvent {
    pub trip_id: Uuid,
    pub creator_id: Uuid,
    pub creator_username: Option<String>,
    pub creator_display_name: Option<String>,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub imported: bool,
    pub timestamp: i64,
}

/// A forwarded email was parsed into a draft waiting for the owner's review.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PendingTripCreatedEvent {
    pub pending_trip_id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    pub confidence_score: f64,
    pub timestamp: i64,
}

/// Envelope handed to the notification fan-out.
///
/// Serialized as `{"type": "...", "payload": {...}}` so consumers can route on
/// the type without knowing every payload shape.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    TripAdded(TripAddedEvent),
    PendingTripCreated(PendingTripCreatedEvent),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::TripAdded(_) => "trip_added",
            Notification::PendingTripCreated(_) => "pending_trip_created",
        }
    }

    /// The user the notification is about.
    pub fn subject_user(&self) -> Uuid {
        match self {
            Notification::TripAdded(event) => event.creator_id,
            Notification::PendingTripCreated(event) => event.user_id,
        }
    }
}
