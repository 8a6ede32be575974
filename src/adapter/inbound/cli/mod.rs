//! CLI module graph.

pub mod analyze;
pub mod check;
pub mod command;
pub mod run;
pub mod scenario;

use std::path::Path;

use anyhow::{Context, Result};

use crate::infrastructure::config::settings::Config;

/// Load a configuration file and start logging from it.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    config.init_logging();
    Ok(config)
}
