//! Configuration for the orchestrator runtime

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory scanned for contract documents (`*.yaml` / `*.yml`).
    #[serde(default = "default_contract_dir")]
    pub contract_dir: PathBuf,

    /// Bounded grace period for in-flight work during shutdown.
    /// Shutdown proceeds regardless once this elapses.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            contract_dir: default_contract_dir(),
            drain_timeout_ms: default_drain_timeout_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_contract_dir() -> PathBuf {
    PathBuf::from("contracts")
}

fn default_drain_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: RuntimeConfig = serde_yaml::from_str("drain_timeout_ms: 250").unwrap();
        assert_eq!(config.drain_timeout_ms, 250);
        assert_eq!(config.contract_dir, PathBuf::from("contracts"));
        assert_eq!(config.logging.level, "info");
    }
}
