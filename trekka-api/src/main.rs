use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trekka_api::middleware::{CircuitBreaker, GuardedExtractor};
use trekka_api::{app, AppState, AuthConfig, Repositories, Settings};
use trekka_core::{Notifier, NoopNotifier};
use trekka_geo::DestinationClassifier;
use trekka_ingest::{OpenAiConfig, OpenAiExtractor};
use trekka_store::app_config::Config;
use trekka_store::{
    DbClient, EventProducer, KafkaNotifier, MemoryStore, PgPendingTripRepository, PgTripRepository,
    PgUserDirectory,
};

async fn repositories(config: &Config) -> anyhow::Result<Repositories> {
    if config.database.url.is_empty() {
        tracing::warn!("No database configured, using the in-memory store");
        return Ok(Repositories::in_memory(Arc::new(MemoryStore::new())));
    }

    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    Ok(Repositories {
        pending: Arc::new(PgPendingTripRepository::new(db.pool.clone())),
        trips: Arc::new(PgTripRepository::new(db.pool.clone())),
        directory: Arc::new(PgUserDirectory::new(db.pool)),
    })
}

fn notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if config.kafka.brokers.is_empty() {
        tracing::warn!("No Kafka brokers configured, notifications are dropped");
        return Ok(Arc::new(NoopNotifier));
    }

    let producer = EventProducer::new(&config.kafka.brokers).context("Failed to create Kafka producer")?;
    Ok(Arc::new(KafkaNotifier::new(producer, config.kafka.notification_topic.clone())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trekka_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Trekka API on port {}", config.server.port);
    tracing::debug!("Config: {:?}", config);

    let classifier = DestinationClassifier::embedded().context("Failed to load location tables")?;

    let openai = OpenAiExtractor::new(OpenAiConfig {
        base_url: config.extractor.base_url.clone(),
        api_key: config.extractor.api_key.clone(),
        model: config.extractor.model.clone(),
        temperature: config.extractor.temperature,
        prompt_body_limit: config.extractor.prompt_body_limit,
        timeout: Duration::from_secs(config.extractor.timeout_seconds),
    })
    .context("Failed to build extractor")?;
    let extractor = GuardedExtractor::new(
        Arc::new(openai),
        CircuitBreaker::new(
            "extractor",
            config.resiliency.extractor_failure_threshold,
            Duration::from_secs(config.resiliency.extractor_reset_seconds),
        ),
    );

    let app_state = AppState::new(
        repositories(&config).await?,
        Arc::new(extractor),
        notifier(&config)?,
        Arc::new(classifier),
        Settings {
            auth: AuthConfig { secret: config.auth.jwt_secret.clone() },
            import_domain: config.ingest.import_domain.clone(),
            stored_body_limit: config.ingest.stored_body_limit,
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
