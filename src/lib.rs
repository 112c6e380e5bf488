//! Mediward hospital records backend
//!
//! This module exports the core functionality of the Mediward backend:
//! resource repositories over SQLite, the HTTP API surface, and local
//! file storage for uploaded report files.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod storage;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub storage: StorageConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
        pub max_connections: u32,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StorageConfig {
        pub upload_dir: String,
    }

    /// Load configuration from defaults, config files and the environment
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("MEDIWARD_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            // Defaults so the server starts without any config file present
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://mediward.db")?
            .set_default("database.max_connections", 5)?
            .set_default("storage.upload_dir", "uploads")?
            // Start with base settings
            .add_source(config::File::with_name("config/default").required(false))
            // Override with environment-specific settings
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables, e.g. MEDIWARD_SERVER__PORT
            .add_source(config::Environment::with_prefix("MEDIWARD").separator("__"))
            .build()?
            .try_deserialize()
    }
}
