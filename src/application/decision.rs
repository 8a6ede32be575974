//! Profit decision rule.
//!
//! Balances the optimizer's remaining uncertainty against capturable profit.
//! The Frank-Wolfe gap bounds how far the final divergence can still be from
//! the true optimum, so `divergence - gap` is a lower bound on the profit of
//! trading toward `mu`.

use std::fmt;

use serde::Serialize;

use super::engine::config::EngineConfig;

/// Why a trade was not approved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Divergence below the minimum worth acting on.
    NearArbitrageFree {
        /// Final divergence.
        divergence: f64,
        /// Configured minimum.
        min_divergence: f64,
    },
    /// Gap too large relative to the divergence.
    AlphaNotMet {
        /// `gap / divergence`, infinite when the divergence is not positive.
        ratio: f64,
        /// Largest admissible ratio, `1 - alpha`.
        max_ratio: f64,
    },
    /// Guaranteed profit does not cover execution cost plus margin.
    ProfitBelowMinimum {
        /// Guaranteed profit minus execution cost.
        net_profit: f64,
        /// Configured minimum.
        min_profit: f64,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearArbitrageFree {
                divergence,
                min_divergence,
            } => write!(
                f,
                "near arbitrage-free: divergence {divergence:.6} < {min_divergence:.6}"
            ),
            Self::AlphaNotMet { ratio, max_ratio } => write!(
                f,
                "alpha threshold not met: gap/divergence {ratio:.4} > {max_ratio:.4}"
            ),
            Self::ProfitBelowMinimum {
                net_profit,
                min_profit,
            } => write!(
                f,
                "profit after costs below minimum: {net_profit:.6} < {min_profit:.6}"
            ),
        }
    }
}

/// Outcome of [`DecisionRule::should_trade`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeDecision {
    /// Whether every check passed.
    pub should_trade: bool,
    /// `max(0, divergence - gap)`.
    pub guaranteed_profit: f64,
    /// Guaranteed profit minus execution cost.
    pub net_profit: f64,
    /// First failed check, if any.
    pub rejection: Option<Rejection>,
    /// Human-readable summary.
    pub reason: String,
}

/// Thresholds for approving a trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionRule {
    /// Fraction of the divergence that must be captured.
    pub alpha: f64,
    /// Divergence below which prices are considered arbitrage-free.
    pub min_divergence: f64,
    /// Minimum profit left after execution cost.
    pub min_profit_after_costs: f64,
}

impl Default for DecisionRule {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for DecisionRule {
    fn from(config: &EngineConfig) -> Self {
        Self {
            alpha: config.alpha,
            min_divergence: config.min_divergence,
            min_profit_after_costs: config.min_profit_after_costs,
        }
    }
}

impl DecisionRule {
    /// Lower bound on profit: `max(0, divergence - gap)`.
    #[must_use]
    pub fn guaranteed_profit(divergence: f64, gap: f64) -> f64 {
        (divergence - gap).max(0.0)
    }

    /// Divergence too small to bother with.
    #[must_use]
    pub fn is_near_arb_free(&self, divergence: f64) -> bool {
        divergence < self.min_divergence
    }

    /// `gap / divergence <= 1 - alpha`; never met for a non-positive divergence.
    #[must_use]
    pub fn alpha_extraction_met(&self, divergence: f64, gap: f64) -> bool {
        divergence > 0.0 && gap / divergence <= 1.0 - self.alpha
    }

    /// Run the checks in order and report the first failure.
    #[must_use]
    pub fn should_trade(&self, divergence: f64, gap: f64, execution_cost: f64) -> TradeDecision {
        let guaranteed_profit = Self::guaranteed_profit(divergence, gap);
        let net_profit = guaranteed_profit - execution_cost;

        let rejection = if self.is_near_arb_free(divergence) {
            Some(Rejection::NearArbitrageFree {
                divergence,
                min_divergence: self.min_divergence,
            })
        } else if !self.alpha_extraction_met(divergence, gap) {
            Some(Rejection::AlphaNotMet {
                ratio: if divergence > 0.0 {
                    gap / divergence
                } else {
                    f64::INFINITY
                },
                max_ratio: 1.0 - self.alpha,
            })
        } else if net_profit < self.min_profit_after_costs {
            Some(Rejection::ProfitBelowMinimum {
                net_profit,
                min_profit: self.min_profit_after_costs,
            })
        } else {
            None
        };

        let reason = match &rejection {
            Some(r) => r.to_string(),
            None => format!(
                "approved: guaranteed profit {guaranteed_profit:.6}, net {net_profit:.6} after cost {execution_cost:.6}"
            ),
        };

        TradeDecision {
            should_trade: rejection.is_none(),
            guaranteed_profit,
            net_profit,
            rejection,
            reason,
        }
    }
}
