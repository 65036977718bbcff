//! Optional RON configuration file for the `riskdash` binary.

use std::fs;
use std::path::Path;
use std::time::Duration;

use riskdash_core::RetryPolicy;
use riskdash_engine::{ControllerSettings, GatewaySettings};
use riskdash_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "riskdash.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// `None` retries a failing status endpoint forever.
    pub max_consecutive_failures: Option<u32>,
    pub max_backoff_ticks: u32,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gateway = GatewaySettings::default();
        let controller = ControllerSettings::default();
        Self {
            base_url: gateway.base_url,
            poll_interval_ms: controller.poll_interval.as_millis() as u64,
            connect_timeout_secs: gateway.connect_timeout.as_secs(),
            request_timeout_secs: gateway.request_timeout.as_secs(),
            max_consecutive_failures: controller.retry.max_consecutive_failures,
            max_backoff_ticks: controller.retry.max_backoff_ticks,
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            retry: RetryPolicy {
                max_consecutive_failures: self.max_consecutive_failures,
                max_backoff_ticks: self.max_backoff_ticks,
            },
        }
    }
}

/// Reads the config at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(err) => return Err(err.into()),
    };
    Ok(ron::from_str(&content)?)
}
