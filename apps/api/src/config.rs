use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which directory backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local store; contents are lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Header carrying the authenticated user's id.
    pub identity_header: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = var("STORE_BACKEND")
            .as_deref()
            .unwrap_or("postgres")
            .parse::<StoreBackend>()?;

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(require(&var, "DATABASE_URL")?),
            StoreBackend::Memory => var("DATABASE_URL"),
        };

        Ok(Config {
            store_backend,
            database_url,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            identity_header: var("IDENTITY_HEADER")
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "x-user-id".to_string()),
        })
    }
}

fn require(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
