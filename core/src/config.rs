//! Startup configuration.
//!
//! RULE: Read once, at startup. A missing connection string is fatal here,
//! never a per-request error.

use crate::source::SqliteSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONNECTION_VAR: &str = "DB_CONNECTION";
pub const TIMEOUT_VAR: &str = "REPORT_QUERY_TIMEOUT_MS";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub connection: String,
    #[serde(default = "default_timeout_ms")]
    pub query_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ReportConfig {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection:       connection.into(),
            query_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Read `DB_CONNECTION` and, optionally, `REPORT_QUERY_TIMEOUT_MS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same rules as `from_env`, over any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let connection = lookup(CONNECTION_VAR).ok_or_else(|| {
            anyhow::anyhow!(
                "{CONNECTION_VAR} is not set; point it at the game store database"
            )
        })?;
        let query_timeout_ms = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("{TIMEOUT_VAR}={raw:?} is not a number: {e}"))?,
            None => DEFAULT_TIMEOUT_MS,
        };
        let config = Self { connection, query_timeout_ms };
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file: `{"connection": "...", "query_timeout_ms": 5000}`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// The data source this configuration points at.
    pub fn source(&self) -> SqliteSource {
        SqliteSource::new(&self.connection).with_timeout(self.query_timeout())
    }

    /// Apply command-line overrides, then re-check the result.
    pub fn with_overrides(
        mut self,
        connection: Option<&str>,
        query_timeout_ms: Option<u64>,
    ) -> anyhow::Result<Self> {
        if let Some(connection) = connection {
            self.connection = connection.to_string();
        }
        if let Some(ms) = query_timeout_ms {
            self.query_timeout_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connection.trim().is_empty() {
            anyhow::bail!("{CONNECTION_VAR} is empty");
        }
        if self.query_timeout_ms == 0 {
            anyhow::bail!("query timeout must be greater than zero");
        }
        Ok(())
    }
}
