use chrono::NaiveDate;
use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub market: MarketConfig,
    pub advisories: AdvisoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Minio,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub json_path: String,
    pub minio: MinioConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub object_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketConfig {
    /// Spending limit given to a caller's first basket.
    pub budget_limit: f64,
    /// First week of generated price history for the seed catalog.
    pub history_start: NaiveDate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub jitter_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Settings {
    /// `config/default.yaml` overlaid with `APP_` environment variables,
    /// e.g. `APP_STORAGE__BACKEND=memory`.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from("config/default")
    }

    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name(file))
            .add_source(config::Environment::with_prefix("APP").prefix_separator("_").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        debug!(
            bind = %settings.server.bind,
            backend = ?settings.storage.backend,
            advisories = settings.advisories.enabled,
            "Loaded settings"
        );

        Ok(settings)
    }
}
