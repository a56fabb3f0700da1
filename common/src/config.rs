// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub marketplace: MarketplaceConfig,
    pub alerting: AlertingConfig,
    pub watcher: WatcherConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

/// Where to look up marketplace inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

/// Where to deliver alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Alert-consumer webhook URL; deliveries are POSTed here.
    pub consumer_url: String,
    pub delivery_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Minutes between watch cycles.
    pub check_interval_minutes: u64,
    /// Cap on concurrently processed vehicles within a cycle.
    pub max_concurrent_checks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Settings {
    /// Load configuration with layered precedence: defaults -> file -> env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if self.database.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }

        if self.marketplace.base_url.is_empty() {
            return Err("Marketplace base_url cannot be empty".to_string());
        }

        if self.alerting.consumer_url.is_empty() {
            return Err("Alert consumer_url cannot be empty".to_string());
        }

        if self.watcher.check_interval_minutes == 0 {
            return Err("Watcher check_interval_minutes must be greater than 0".to_string());
        }
        if self.watcher.max_concurrent_checks == 0 {
            return Err("Watcher max_concurrent_checks must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/alert_producer".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
            },
            marketplace: MarketplaceConfig {
                base_url: "https://kennyupull.example.com/api".to_string(),
                request_timeout_seconds: 30,
            },
            alerting: AlertingConfig {
                consumer_url: "http://localhost:8081/v1/new-listing-consumer".to_string(),
                delivery_timeout_seconds: 10,
            },
            watcher: WatcherConfig {
                check_interval_minutes: 30,
                max_concurrent_checks: 16,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_empty_database_url() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_interval() {
        let mut settings = Settings::default();
        settings.watcher.check_interval_minutes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_empty_consumer_url() {
        let mut settings = Settings::default();
        settings.alerting.consumer_url = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_zero_concurrency() {
        let mut settings = Settings::default();
        settings.watcher.max_concurrent_checks = 0;
        assert!(settings.validate().is_err());
    }
}
