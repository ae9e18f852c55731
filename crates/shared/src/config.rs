//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Webhook outbox and delivery configuration.
    pub webhook: WebhookConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default)]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Webhook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret used to sign every outbound body.
    pub secret: String,
    /// Merchant endpoint notified of payment events. Nothing is enqueued when unset.
    #[serde(default)]
    pub merchant_url: Option<String>,
    /// Sleep between polls when the outbox is empty.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Upper bound on a single delivery attempt.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Attempts before a job is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Delay after the first failed attempt.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_secs: u64,
    /// Ceiling for the retry delay.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
    /// Number of worker tasks draining the outbox.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    5
}

fn default_max_attempts() -> i32 {
    5
}

fn default_base_backoff() -> u64 {
    10
}

fn default_max_backoff() -> u64 {
    3600 // 1 hour
}

fn default_workers() -> usize {
    1
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PAYLANE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
