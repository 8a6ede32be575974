//! Engine tuning shared by the optimizer, the decision rule and trade sizing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::solver::frank_wolfe::{FrankWolfeConfig, DEFAULT_MAX_STEP};
use crate::domain::market_state::Normalization;
use crate::error::ConfigError;

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fraction of the divergence that must be captured, in (0, 1).
    pub alpha: f64,
    /// Divergence below which a group counts as arbitrage-free.
    pub min_divergence: f64,
    /// Frank-Wolfe iteration cap.
    pub max_iterations: usize,
    /// Frank-Wolfe gap tolerance.
    pub tolerance: f64,
    /// Deadline for each solver feasibility search.
    pub solver_timeout_seconds: f64,
    /// Minimum profit left after execution cost.
    pub min_profit_after_costs: f64,
    /// Cost charged against guaranteed profit.
    pub execution_cost: f64,
    /// LMSR liquidity parameter `b`.
    pub liquidity_param: f64,
    /// Cap on the Frank-Wolfe line-search step, in (0, 1].
    pub max_step: f64,
    /// Minimum `|mu_i - price_i|` for a trade leg.
    pub trade_threshold: f64,
    /// Quantity per unit of price difference.
    pub position_scale: f64,
    /// How implied prices are normalized.
    pub normalization: Normalization,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            min_divergence: 0.025,
            max_iterations: 100,
            tolerance: 1e-6,
            solver_timeout_seconds: 5.0,
            min_profit_after_costs: 0.01,
            execution_cost: 0.02,
            liquidity_param: 100.0,
            max_step: DEFAULT_MAX_STEP,
            trade_threshold: 0.01,
            position_scale: 100.0,
            normalization: Normalization::Global,
        }
    }
}

impl EngineConfig {
    /// Check every field's range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(invalid("alpha", "must be in (0, 1)"));
        }
        if !(self.min_divergence >= 0.0) {
            return Err(invalid("min_divergence", "must be >= 0"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be > 0"));
        }
        if !(self.tolerance > 0.0) {
            return Err(invalid("tolerance", "must be > 0"));
        }
        if !(self.solver_timeout_seconds > 0.0)
            || Duration::try_from_secs_f64(self.solver_timeout_seconds).is_err()
        {
            return Err(invalid("solver_timeout_seconds", "must be a positive duration"));
        }
        if !(self.min_profit_after_costs >= 0.0) {
            return Err(invalid("min_profit_after_costs", "must be >= 0"));
        }
        if !(self.execution_cost >= 0.0) {
            return Err(invalid("execution_cost", "must be >= 0"));
        }
        if !(self.liquidity_param > 0.0 && self.liquidity_param.is_finite()) {
            return Err(invalid("liquidity_param", "must be > 0"));
        }
        if !(self.max_step > 0.0 && self.max_step <= 1.0) {
            return Err(invalid("max_step", "must be in (0, 1]"));
        }
        if !(self.trade_threshold >= 0.0) {
            return Err(invalid("trade_threshold", "must be >= 0"));
        }
        if !(self.position_scale > 0.0 && self.position_scale.is_finite()) {
            return Err(invalid("position_scale", "must be > 0"));
        }
        Ok(())
    }

    /// Solver deadline as a [`Duration`].
    #[must_use]
    pub fn solver_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.solver_timeout_seconds).unwrap_or(Duration::from_secs(5))
    }

    /// Optimizer settings derived from this configuration.
    #[must_use]
    pub fn frank_wolfe(&self) -> FrankWolfeConfig {
        FrankWolfeConfig {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            alpha: self.alpha,
            max_step: self.max_step,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}
