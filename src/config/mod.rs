use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub media: MediaConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub api_rate_limit: u64,
}

/// Tuning for the ranking and suggestion passes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_results: usize,
    pub max_suggestions: usize,
    pub probe_timeout_ms: u64,
    pub probe_concurrency: usize,
    pub fragment_probe_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub images_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub random_default_limit: i64,
    pub random_max_limit: i64,
    pub related_limit: i64,
    pub max_request_body_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            max_suggestions: 5,
            probe_timeout_ms: 2000,
            probe_concurrency: 4,
            fragment_probe_limit: 5,
        }
    }
}

impl SearchConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Read an environment variable, falling back to `default` when unset
fn env_or<T: FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/velavida.db?mode=rwc".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let external_url = std::env::var("EXTERNAL_URL").ok();
        let images_base_url = std::env::var("IMAGES_BASE_URL")
            .unwrap_or_else(|_| "https://s3.amazonaws.com/velavida-images/".to_string());

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", "10")?,
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", "1")?,
                connection_timeout_seconds: env_or("DATABASE_CONNECTION_TIMEOUT", "30")?,
                idle_timeout_seconds: env_or("DATABASE_IDLE_TIMEOUT", "600")?,
            },
            server: ServerConfig {
                host,
                port: env_or("PORT", "8000")?,
                external_url,
                api_rate_limit: env_or("API_RATE_LIMIT", "100")?,
            },
            search: SearchConfig {
                max_results: env_or("SEARCH_MAX_RESULTS", "100")?,
                max_suggestions: env_or("SEARCH_MAX_SUGGESTIONS", "5")?,
                probe_timeout_ms: env_or("SEARCH_PROBE_TIMEOUT_MS", "2000")?,
                probe_concurrency: env_or("SEARCH_PROBE_CONCURRENCY", "4")?,
                fragment_probe_limit: env_or("SEARCH_FRAGMENT_PROBE_LIMIT", "5")?,
            },
            media: MediaConfig { images_base_url },
            pagination: PaginationConfig {
                random_default_limit: env_or("RANDOM_DEFAULT_LIMIT", "10")?,
                random_max_limit: env_or("RANDOM_MAX_LIMIT", "50")?,
                related_limit: env_or("RELATED_LIMIT", "5")?,
                max_request_body_size: env_or("MAX_REQUEST_BODY_SIZE", "1048576")?,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.search.probe_concurrency == 0 {
            return Err(Error::Config(
                "Probe concurrency must be non-zero".to_string(),
            ));
        }

        if self.search.probe_timeout_ms == 0 {
            return Err(Error::Config("Probe timeout must be non-zero".to_string()));
        }

        if !(1..=5).contains(&self.search.max_suggestions) {
            return Err(Error::Config(
                "Max suggestions must be between 1 and 5".to_string(),
            ));
        }

        if self.pagination.random_max_limit < 1 || self.pagination.random_default_limit < 1 {
            return Err(Error::Config(
                "Random recipe limits must be positive".to_string(),
            ));
        }

        url::Url::parse(&self.media.images_base_url)?;

        Ok(())
    }
}

#[cfg(test)]
impl Settings {
    pub(crate) fn for_tests() -> Self {
        Settings {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
                connection_timeout_seconds: 30,
                idle_timeout_seconds: 600,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                external_url: None,
                api_rate_limit: 100,
            },
            search: SearchConfig::default(),
            media: MediaConfig {
                images_base_url: "https://images.example.com/".to_string(),
            },
            pagination: PaginationConfig {
                random_default_limit: 10,
                random_max_limit: 50,
                related_limit: 5,
                max_request_body_size: 1048576,
            },
        }
    }
}
