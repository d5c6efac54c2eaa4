//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use med_alt_core::db::{StoreConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_POOL_SIZE};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub store: StoreConfig,
    /// Searches allowed to wait for a connection beyond the pool size; 0 = unbounded
    pub queue_limit: u32,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Environment Variables
    /// - `DB_NAME`: SQLite database file (required)
    /// - `DB_POOL_SIZE`: pooled connections (default: 10)
    /// - `DB_QUEUE_LIMIT`: extra waiting searches, 0 = unbounded (default: 0)
    /// - `DB_CONNECT_TIMEOUT_MS`: connection acquisition timeout (default: 20000)
    /// - `HOST`: listen address (default: "0.0.0.0")
    /// - `PORT`: listen port (default: 3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DB_NAME")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DB_NAME"))?;

        let pool_size = parse_or(&lookup, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_POOL_SIZE",
                value: "0".into(),
                reason: "pool needs at least one connection".into(),
            });
        }

        let default_timeout_ms = DEFAULT_CONNECT_TIMEOUT.as_millis() as u64;
        let connect_timeout_ms = parse_or(&lookup, "DB_CONNECT_TIMEOUT_MS", default_timeout_ms)?;

        Ok(Self {
            store: StoreConfig {
                database: database.into(),
                pool_size,
                connect_timeout: Duration::from_millis(connect_timeout_ms),
            },
            queue_limit: parse_or(&lookup, "DB_QUEUE_LIMIT", 0)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: "HOST",
            value: self.host.clone(),
            reason: e.to_string(),
        })
    }

    /// Maximum searches in flight, `None` when unbounded.
    pub fn max_in_flight(&self) -> Option<usize> {
        match self.queue_limit {
            0 => None,
            limit => Some((self.store.pool_size + limit) as usize),
        }
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
