use serde::Deserialize;
use std::env;
use trekka_shared::Masked;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub auth: AuthConfig,
    pub extractor: ExtractorConfig,
    pub ingest: IngestConfig,
    pub resiliency: ResiliencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Empty means "no database": the in-memory store is used instead.
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    /// Empty disables the notification producer.
    #[serde(default)]
    pub brokers: String,
    #[serde(default = "default_notification_topic")]
    pub notification_topic: String,
}

fn default_notification_topic() -> String {
    "trekka.notifications".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Masked<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractorConfig {
    pub base_url: String,
    pub api_key: Masked<String>,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Characters of body text sent to the model.
    #[serde(default = "default_prompt_body_limit")]
    pub prompt_body_limit: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_temperature() -> f32 { 0.1 }
fn default_prompt_body_limit() -> usize { 3000 }
fn default_timeout_seconds() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Domain of the per-user import addresses.
    pub import_domain: String,
    /// Characters of body text kept on the pending record.
    #[serde(default = "default_stored_body_limit")]
    pub stored_body_limit: usize,
}

fn default_stored_body_limit() -> usize { 1000 }

#[derive(Debug, Deserialize, Clone)]
pub struct ResiliencyConfig {
    pub extractor_failure_threshold: usize,
    pub extractor_reset_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TREKKA__EXTRACTOR__API_KEY=sk-...`
            .add_source(config::Environment::with_prefix("TREKKA").prefix_separator("__").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
