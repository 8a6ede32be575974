//! `[logging]` section: level filter and output format.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }

    /// Install the global subscriber, writing to stderr.
    ///
    /// A second call is a no-op; the first installed subscriber stays.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));
        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

        let installed = if self.is_json() {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}
