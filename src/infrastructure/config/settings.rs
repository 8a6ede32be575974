//! The `config.toml` file: loading and validation.
//!
//! [`Config`] holds one field per top-level table.
//! Configuration is loaded from a TOML file; `RUST_LOG` overrides the
//! configured log level.
//!
//! # Example
//!
//! ```no_run
//! use polyedge::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::engine::EngineAppConfig;
use super::logging::LoggingConfig;
use super::service::ServiceAppConfig;
use crate::application::engine::{EngineConfig, ServiceConfig};
use crate::error::{ConfigError, Result};

/// Parsed `config.toml`.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Engine thresholds. Required.
    #[serde(default)]
    pub engine: Option<EngineAppConfig>,

    /// Background service settings.
    #[serde(default)]
    pub service: ServiceAppConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - The `[engine]` table is missing
    /// - Validation fails (e.g., `alpha` outside (0, 1))
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Range checks that serde cannot express.
    fn validate(&self) -> Result<()> {
        self.engine_config()?.validate()?;

        if self.service.analysis_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis_interval_ms",
                reason: "must be positive".into(),
            }
            .into());
        }
        if self.service.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be positive".into(),
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The engine's core configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no `[engine]` table was given.
    pub fn engine_config(&self) -> std::result::Result<EngineConfig, ConfigError> {
        self.engine
            .as_ref()
            .map(EngineAppConfig::to_core_config)
            .ok_or(ConfigError::MissingField { field: "engine" })
    }

    /// The background service configuration.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        self.service.to_core_config()
    }

    /// Install the tracing subscriber described by `[logging]`.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
