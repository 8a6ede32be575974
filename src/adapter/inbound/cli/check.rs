//! Handler for the `check` command.

use anyhow::{Context, Result};

use crate::adapter::inbound::cli::command::CheckArgs;
use crate::infrastructure::config::settings::Config;

/// Validate a configuration file without starting the engine.
pub fn execute(args: &CheckArgs) -> Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;
    let engine = config.engine_config()?;

    println!("Configuration check");
    println!("  Config              {}", args.config.display());
    println!("  alpha               {}", engine.alpha);
    println!("  min_divergence      {}", engine.min_divergence);
    println!("  max_iterations      {}", engine.max_iterations);
    println!("  solver_timeout      {}s", engine.solver_timeout_seconds);
    println!("  execution_cost      {}", engine.execution_cost);
    println!("  liquidity_param     {}", engine.liquidity_param);
    println!("  normalization       {:?}", engine.normalization);
    println!(
        "  analysis_interval   {}ms",
        config.service.analysis_interval_ms
    );
    println!("Configuration file is valid");
    Ok(())
}
