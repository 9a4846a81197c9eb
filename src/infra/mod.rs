pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, DatabaseConfig, StorageBackend};
