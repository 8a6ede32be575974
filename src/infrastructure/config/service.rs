//! Background service configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::engine::ServiceConfig;

/// Tick loop settings from the `[service]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAppConfig {
    /// Interval between full sweeps over every group (milliseconds).
    #[serde(default = "default_analysis_interval_ms")]
    pub analysis_interval_ms: u64,
    /// Capacity of the inbound tick channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

const fn default_analysis_interval_ms() -> u64 {
    5000
}

const fn default_channel_capacity() -> usize {
    1024
}

impl Default for ServiceAppConfig {
    fn default() -> Self {
        Self {
            analysis_interval_ms: default_analysis_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl ServiceAppConfig {
    /// Convert to the service's runtime configuration.
    #[must_use]
    pub fn to_core_config(&self) -> ServiceConfig {
        ServiceConfig {
            analysis_interval: Duration::from_millis(self.analysis_interval_ms),
        }
    }
}
