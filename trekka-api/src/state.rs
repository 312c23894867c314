use std::sync::Arc;

use trekka_core::repository::{PendingTripRepository, TripRepository, UserDirectory};
use trekka_core::Notifier;
use trekka_geo::DestinationClassifier;
use trekka_ingest::{Ingestor, TripExtractor};
use trekka_shared::Masked;
use trekka_store::MemoryStore;
use trekka_trips::{PendingTripManager, TripAnnouncer, TripService};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Masked<String>,
}

/// Storage handles the services are built from.
pub struct Repositories {
    pub pending: Arc<dyn PendingTripRepository>,
    pub trips: Arc<dyn TripRepository>,
    pub directory: Arc<dyn UserDirectory>,
}

impl Repositories {
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            pending: store.clone(),
            trips: store.clone(),
            directory: store,
        }
    }
}

pub struct Settings {
    pub auth: AuthConfig,
    pub import_domain: String,
    pub stored_body_limit: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    pub review: Arc<PendingTripManager>,
    pub trips: Arc<TripService>,
    pub classifier: Arc<DestinationClassifier>,
    pub directory: Arc<dyn UserDirectory>,
    pub auth: AuthConfig,
    pub import_domain: String,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        extractor: Arc<dyn TripExtractor>,
        notifier: Arc<dyn Notifier>,
        classifier: Arc<DestinationClassifier>,
        settings: Settings,
    ) -> Self {
        let announcer = TripAnnouncer::new(repos.directory.clone(), notifier.clone());
        let ingestor = Ingestor::new(repos.directory.clone(), repos.pending.clone(), extractor, notifier)
            .with_stored_body_limit(settings.stored_body_limit);

        Self {
            ingestor: Arc::new(ingestor),
            review: Arc::new(PendingTripManager::new(repos.pending, announcer.clone())),
            trips: Arc::new(TripService::new(repos.trips, announcer)),
            classifier,
            directory: repos.directory,
            auth: settings.auth,
            import_domain: settings.import_domain,
        }
    }
}
