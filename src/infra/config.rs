//! Centralized configuration (environment variables + defaults).

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is invalid: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Which [`crate::storage::ReviewStore`] backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected `postgres` or `memory`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full DSN; takes precedence over the individual fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::invalid("DATABASE_URL", e));
        }
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| ConfigError::invalid("DB_SSLMODE", e))?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(ssl_mode))
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub filter: String,
    /// `None` lets the logger pick JSON when stderr is not a terminal.
    pub json: Option<bool>,
    pub service_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub storage_backend: StorageBackend,
    pub database: DatabaseConfig,
    pub request_timeout: Duration,
    pub log: LogConfig,
}

impl AppConfig {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let listen_addr = parse(&get, "LISTEN_ADDR", "0.0.0.0:50051")?;
        let storage_backend = parse(&get, "STORAGE_BACKEND", "postgres")?;
        let port = parse(&get, "DB_PORT", "5432")?;
        let max_connections: u32 = parse(&get, "DB_MAX_CONNECTIONS", "5")?;
        let timeout_ms: u64 = parse(&get, "REQUEST_TIMEOUT_MS", "5000")?;
        let json = match get("RUST_LOG_JSON") {
            Some(v) => Some(
                v.parse::<bool>()
                    .map_err(|e| ConfigError::invalid("RUST_LOG_JSON", e))?,
            ),
            None => None,
        };

        Ok(Self {
            listen_addr,
            storage_backend,
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                host: or("DB_HOST", "localhost"),
                port,
                user: or("DB_USER", "postgres"),
                password: get("DB_PASSWORD").unwrap_or_default(),
                name: or("DB_NAME", "review"),
                ssl_mode: or("DB_SSLMODE", "disable"),
                max_connections: max_connections.max(1),
            },
            request_timeout: Duration::from_millis(timeout_ms),
            log: LogConfig {
                filter: or("RUST_LOG", "info"),
                json,
                service_name: or("SERVICE_NAME", "review"),
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(key, e))
}
