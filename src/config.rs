use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DOCUMENT_KEY: &str = "equity-console:app-document";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub document_key: String,
    pub save_debounce: Duration,
    pub seed_scenario: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let document_key = match env_map.get("DOCUMENT_KEY").map(|s| s.trim()) {
            None => DEFAULT_DOCUMENT_KEY.to_string(),
            Some("") => {
                return Err(ConfigError::InvalidValue(
                    "DOCUMENT_KEY".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Some(key) => key.to_string(),
        };

        let save_debounce_ms = env_map
            .get("SAVE_DEBOUNCE_MS")
            .map(|s| s.as_str())
            .unwrap_or("500")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "SAVE_DEBOUNCE_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        let seed_scenario = env_map
            .get("SEED_SCENARIO")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Config {
            port,
            database_path,
            document_key,
            save_debounce: Duration::from_millis(save_debounce_ms),
            seed_scenario,
        })
    }
}
