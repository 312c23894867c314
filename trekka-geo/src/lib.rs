pub mod classifier;
pub mod tables;

pub use classifier::{Country, DestinationClassification, DestinationClassifier, UNKNOWN_FLAG, UNKNOWN_REGION};
pub use tables::{GeoError, LocationTables};
