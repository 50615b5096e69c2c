use std::{env, path::PathBuf};

use reqwest::Url;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub scraper_endpoint: String,
    pub blob_root: PathBuf,
    pub blob_public_url: String,
    /// Where uploads are staged before they reach blob storage.
    pub upload_dir: PathBuf,
    pub cors_origin: String,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let load = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };
        let temp_dir = env::temp_dir().join("recipe-uploads");

        let config = Config {
            mongo_uri: load("MONGO_URI", "mongodb://localhost:27017/"),
            mongo_database: load("MONGO_DATABASE", "recipes"),
            scraper_endpoint: load("SCRAPER_ENDPOINT", "http://localhost:5000"),
            blob_root: PathBuf::from(load("BLOB_ROOT", "./images")),
            blob_public_url: load("BLOB_PUBLIC_URL", "http://localhost:8000/images"),
            upload_dir: PathBuf::from(load("UPLOAD_DIR", &temp_dir.to_string_lossy())),
            cors_origin: load("CORS_ORIGIN", "*"),
        };
        check_url("SCRAPER_ENDPOINT", &config.scraper_endpoint)?;
        check_url("BLOB_PUBLIC_URL", &config.blob_public_url)?;
        Ok(config)
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?}: {e}"),
    })
}
