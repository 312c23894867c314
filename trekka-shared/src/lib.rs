pub mod models;
pub mod pii;

pub use models::events::{Notification, PendingTripCreatedEvent, TripAddedEvent};
pub use pii::Masked;
