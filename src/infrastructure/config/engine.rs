//! Engine section of the configuration file.
//!
//! The eight core thresholds are required; the remaining knobs fall back to
//! the engine defaults.

use serde::Deserialize;

use crate::application::engine::EngineConfig;
use crate::application::solver::frank_wolfe::DEFAULT_MAX_STEP;
use crate::domain::market_state::Normalization;

/// Raw `[engine]` table as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineAppConfig {
    pub alpha: f64,
    pub min_divergence: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub solver_timeout_seconds: f64,
    pub min_profit_after_costs: f64,
    pub execution_cost: f64,
    pub liquidity_param: f64,

    /// Cap on the Frank-Wolfe step.
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// Minimum price gap for a trade leg.
    #[serde(default = "default_trade_threshold")]
    pub trade_threshold: f64,
    /// Quantity per unit of price gap.
    #[serde(default = "default_position_scale")]
    pub position_scale: f64,
    #[serde(default)]
    pub normalization: Normalization,
}

const fn default_max_step() -> f64 {
    DEFAULT_MAX_STEP
}

fn default_trade_threshold() -> f64 {
    0.01
}

fn default_position_scale() -> f64 {
    100.0
}

impl EngineAppConfig {
    /// Convert to the engine's core configuration.
    #[must_use]
    pub fn to_core_config(&self) -> EngineConfig {
        EngineConfig {
            alpha: self.alpha,
            min_divergence: self.min_divergence,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            solver_timeout_seconds: self.solver_timeout_seconds,
            min_profit_after_costs: self.min_profit_after_costs,
            execution_cost: self.execution_cost,
            liquidity_param: self.liquidity_param,
            max_step: self.max_step,
            trade_threshold: self.trade_threshold,
            position_scale: self.position_scale,
            normalization: self.normalization,
        }
    }
}
