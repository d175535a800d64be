use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{IngestionConfig, PREVIEW_ROW_LIMIT};

pub const CONFIG_FILE: &str = "insightboard.toml";
pub const ENV_PREFIX: &str = "INSIGHTBOARD_";

/// Runtime settings: defaults, then `insightboard.toml`, then
/// `INSIGHTBOARD_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub preview_limit: usize,
    pub read_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "sqlite://insightboard.db".to_string(),
            upload_dir: PathBuf::from("data/uploads"),
            preview_limit: PREVIEW_ROW_LIMIT,
            read_timeout_secs: 30,
            max_upload_bytes: 20 * 1024 * 1024,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, reading `.env` first when present
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "read_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::ValidationError(
                "max_upload_bytes must be > 0".to_string(),
            ));
        }
        self.ingestion()
            .validate()
            .map_err(AppError::ValidationError)
    }

    pub fn ingestion(&self) -> IngestionConfig {
        IngestionConfig::new().with_preview_limit(self.preview_limit)
    }

    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.read_timeout_secs)
    }
}
