//! Environment-driven store configuration.

use std::time::Duration;

use anyhow::Context;

/// Connection and contention knobs for the Postgres-backed store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    /// Bound on row-lock waits inside the sell transaction. Contention past
    /// this bound surfaces to the caller as `Busy` instead of blocking
    /// indefinitely.
    pub lock_timeout: Duration,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2_000);
    pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required; the rest falls back to defaults, with a
    /// warning when a value is present but malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let mut config = Self::new(database_url);

        if let Ok(raw) = std::env::var("LEDGER_LOCK_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.lock_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    %raw,
                    "LEDGER_LOCK_TIMEOUT_MS is not a positive integer; using default"
                ),
            }
        }

        if let Ok(raw) = std::env::var("LEDGER_MAX_CONNECTIONS") {
            match raw.parse::<u32>() {
                Ok(n) if n > 0 => config.max_connections = n,
                _ => tracing::warn!(
                    %raw,
                    "LEDGER_MAX_CONNECTIONS is not a positive integer; using default"
                ),
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let config = StoreConfig::new("postgres://localhost/vitrine");
        assert_eq!(config.lock_timeout, StoreConfig::DEFAULT_LOCK_TIMEOUT);
        assert_eq!(config.max_connections, StoreConfig::DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout, StoreConfig::DEFAULT_ACQUIRE_TIMEOUT);
    }
}
