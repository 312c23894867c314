pub mod notify;
pub mod pending;
pub mod profile;
pub mod repository;
pub mod trip;

pub use notify::{Notifier, NotifyError, NoopNotifier};
pub use pending::{EmailProvenance, PendingStatus, PendingTrip, ReviewDecision, TripCandidate, TripType};
pub use profile::Profile;
pub use repository::{PendingTripRepository, StoreError, TripRepository, UserDirectory};
pub use trip::{NewTrip, Trip};

/// Failure taxonomy shared by ingestion, review and trip creation.
///
/// Every variant is terminal for the operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    /// Also used for records owned by someone else, so existence never leaks.
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Extraction failed: {0}")]
    ExtractionError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Dependency failure: {0}")]
    DependencyError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => CoreError::NotFoundError("record not found".to_string()),
            StoreError::NotPending(status) => {
                CoreError::ConflictError(format!("pending trip is already {}", status))
            }
            StoreError::Backend(msg) => CoreError::DependencyError(msg),
        }
    }
}
