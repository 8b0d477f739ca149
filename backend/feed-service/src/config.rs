/// Configuration management for Feed Service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Feed paging configuration
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port)
    pub url: String,
}

/// Feed paging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size applied when the client omits `limit`
    #[serde(default = "default_feed_limit")]
    pub default_limit: u32,
    /// Upper bound a client-supplied `limit` is clamped to
    #[serde(default = "default_feed_max_limit")]
    pub max_limit: u32,
}

fn default_max_connections() -> u32 {
    20
}

fn default_feed_limit() -> u32 {
    10
}

fn default_feed_max_limit() -> u32 {
    50
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8084),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
        };

        let feed = FeedConfig {
            default_limit: std::env::var("FEED_DEFAULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_feed_limit),
            max_limit: std::env::var("FEED_MAX_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_feed_max_limit),
        };

        Ok(Config {
            app,
            database,
            redis,
            feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("REDIS_URL", "redis://localhost");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8084);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.feed.default_limit, 10);
        assert_eq!(config.feed.max_limit, 50);
    }
}
