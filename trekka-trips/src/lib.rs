pub mod announce;
pub mod review;
pub mod trips;

#[cfg(test)]
mod test_support;

pub use announce::TripAnnouncer;
pub use review::{ConfirmEdits, PendingTripManager};
pub use trips::{TripDraft, TripService};
