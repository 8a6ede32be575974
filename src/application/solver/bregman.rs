//! Solver utilities for LMSR Bregman divergence.
//!
//! For the Logarithmic Market Scoring Rule (LMSR):
//!
//! - Cost function: `C(q) = b * log(sum(exp(q_i/b)))`
//! - Conjugate: `R(mu) = sum(mu_i * ln(mu_i))` (negative entropy)
//! - Bregman divergence: `D(mu||theta) = KL divergence`
//!
//! The divergence `D(mu*||theta)` equals the maximum arbitrage profit,
//! making these calculations central to combinatorial arbitrage detection.
//!
//! All functions take the implied prices `p = softmax(theta / b)` rather than
//! `theta` itself and floor every log argument at
//! [`PROBABILITY_FLOOR`].

use crate::domain::market_state::PROBABILITY_FLOOR;

/// Compute Bregman divergence `D(mu||p) = sum(mu_i * ln(mu_i / p_i))`.
///
/// Returns zero if inputs are empty or mismatched.
#[must_use]
pub fn bregman_divergence(mu: &[f64], prices: &[f64]) -> f64 {
    if mu.len() != prices.len() || mu.is_empty() {
        return 0.0;
    }

    mu.iter()
        .zip(prices)
        .map(|(&m, &p)| m * (m.max(PROBABILITY_FLOOR).ln() - p.max(PROBABILITY_FLOOR).ln()))
        .sum()
}

/// Compute the gradient of the divergence with respect to `mu`.
///
/// `dD/dmu_i = ln(mu_i) - ln(p_i)`. The constant `+1` of the exact KL
/// derivative is dropped; it shifts every vertex score by the same amount
/// within an outcome block.
#[must_use]
pub fn bregman_gradient(mu: &[f64], prices: &[f64]) -> Vec<f64> {
    mu.iter()
        .zip(prices)
        .map(|(&m, &p)| m.max(PROBABILITY_FLOOR).ln() - p.max(PROBABILITY_FLOOR).ln())
        .collect()
}

/// Compute the LMSR cost function `C(q) = b * ln(sum(exp(q_i/b)))`.
///
/// Uses the log-sum-exp shift so large quantities do not overflow. Returns
/// zero if inputs are empty or `b` is not positive.
#[must_use]
pub fn lmsr_cost(q: &[f64], b: f64) -> f64 {
    if q.is_empty() || b <= 0.0 {
        return 0.0;
    }

    let max = q.iter().map(|qi| qi / b).fold(f64::NEG_INFINITY, f64::max);
    let sum_exp: f64 = q.iter().map(|qi| (qi / b - max).exp()).sum();
    b * (max + sum_exp.ln())
}
