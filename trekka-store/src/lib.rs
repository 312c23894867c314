pub mod app_config;
pub mod database;
pub mod events;
pub mod memory;
pub mod pending_trip_repo;
pub mod profile_repo;
pub mod trip_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use events::{EventProducer, KafkaNotifier};
pub use memory::MemoryStore;
pub use pending_trip_repo::PgPendingTripRepository;
pub use profile_repo::PgUserDirectory;
pub use trip_repo::PgTripRepository;
