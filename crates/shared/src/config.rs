//! Application configuration management.
//!
//! Secrets have no literal fallbacks: a missing scheduler token or processor
//! base URL fails startup instead of silently substituting a default.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Payment processor configuration.
    pub processor: ProcessorConfig,
    /// Notification service configuration.
    pub notifier: NotifierConfig,
    /// Scheduled job configuration.
    pub jobs: JobsConfig,
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

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
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
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Payment processor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    /// Base URL of the payment processor API. Required.
    pub base_url: String,
    /// API key for the processor. Required.
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_processor_timeout")]
    pub timeout_secs: u64,
}

fn default_processor_timeout() -> u64 {
    30
}

/// Notification service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Base URL of the notification service. Required.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_notifier_timeout")]
    pub timeout_secs: u64,
}

fn default_notifier_timeout() -> u64 {
    10
}

/// Scheduled job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Shared secret for the external scheduler trigger. Required.
    pub token: String,
    /// Reminder window in hours before a hold deadline.
    #[serde(default = "default_reminder_window")]
    pub reminder_window_hours: u32,
}

fn default_reminder_window() -> u32 {
    24
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, or if a required
    /// secret (jobs token, processor credentials) is absent.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ROVIA").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty required secrets that a file may have left blank.
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jobs.token.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "jobs.token must be set (ROVIA__JOBS__TOKEN)".to_string(),
            ));
        }
        if self.processor.base_url.trim().is_empty() || self.processor.api_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "processor.base_url and processor.api_key must be set".to_string(),
            ));
        }
        Ok(())
    }
}
