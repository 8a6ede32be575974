//! LMSR market state derived from observed prices.
//!
//! For the Logarithmic Market Scoring Rule with liquidity `b`, the state
//! vector is `theta_i = b * ln(price_i)` and prices are recovered as
//! `softmax(theta / b)`. When the observed prices already sum to one the
//! round trip is exact; otherwise the softmax renormalizes them.
//!
//! A group of `n` markets has vertices whose coordinates sum to `n`, so a
//! group-wide state carries a probability mass of `n` and its implied prices
//! are `n * softmax(theta / b)`. Without that scale a fairly priced group
//! would sit `n * ln(n)` away from every point of its polytope.

use serde::{Deserialize, Serialize};

/// Floor applied before every logarithm and division.
pub const PROBABILITY_FLOOR: f64 = 1e-10;

/// How implied prices are normalized when converting back from `theta`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// One softmax over every security in the group, scaled by the number
    /// of markets.
    #[default]
    Global,
    /// An independent softmax within each market's outcome block.
    PerMarket,
}

/// Convert prices into LMSR state: `theta_i = b * ln(max(p_i, 1e-10))`.
#[must_use]
pub fn prices_to_theta(prices: &[f64], liquidity: f64) -> Vec<f64> {
    prices
        .iter()
        .map(|&p| liquidity * p.max(PROBABILITY_FLOOR).ln())
        .collect()
}

/// Convert LMSR state back into prices: `softmax(theta / b)`.
#[must_use]
pub fn theta_to_prices(theta: &[f64], liquidity: f64) -> Vec<f64> {
    softmax(theta, liquidity)
}

/// Overround of a mutually exclusive, exhaustive price vector: `|sum(p) - 1|`.
#[must_use]
pub fn compute_mispricing(prices: &[f64]) -> f64 {
    (prices.iter().sum::<f64>() - 1.0).abs()
}

fn softmax(theta: &[f64], liquidity: f64) -> Vec<f64> {
    if theta.is_empty() || liquidity <= 0.0 {
        return Vec::new();
    }
    let max = theta
        .iter()
        .map(|t| t / liquidity)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = theta.iter().map(|t| (t / liquidity - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter()
        .map(|e| e / sum.max(PROBABILITY_FLOOR))
        .collect()
}

/// Market-maker state `(theta, b)` for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    theta: Vec<f64>,
    liquidity: f64,
    #[serde(default = "unit_mass")]
    mass: f64,
    blocks: Option<Vec<Vec<usize>>>,
}

const fn unit_mass() -> f64 {
    1.0
}

impl MarketState {
    /// Derive the state from observed prices with a single global softmax.
    #[must_use]
    pub fn from_prices(prices: &[f64], liquidity: f64) -> Self {
        Self {
            theta: prices_to_theta(prices, liquidity),
            liquidity,
            mass: unit_mass(),
            blocks: None,
        }
    }

    /// Total probability mass of the global softmax, one per market.
    ///
    /// Ignored once outcome blocks are set; each block then sums to one.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Normalize within each outcome block instead of globally.
    ///
    /// Securities not covered by any block keep their raw implied price.
    #[must_use]
    pub fn with_blocks(mut self, blocks: Vec<Vec<usize>>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    /// LMSR state vector.
    #[must_use]
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Liquidity parameter `b`.
    #[must_use]
    pub const fn liquidity(&self) -> f64 {
        self.liquidity
    }

    /// Number of securities.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.theta.len()
    }

    /// Implied probabilities recovered from `theta`.
    #[must_use]
    pub fn prices(&self) -> Vec<f64> {
        let Some(blocks) = &self.blocks else {
            return softmax(&self.theta, self.liquidity)
                .into_iter()
                .map(|p| p * self.mass)
                .collect();
        };

        let mut prices: Vec<f64> = self
            .theta
            .iter()
            .map(|t| (t / self.liquidity).exp())
            .collect();
        for block in blocks {
            let block_theta: Vec<f64> = block
                .iter()
                .filter_map(|&i| self.theta.get(i).copied())
                .collect();
            let normalized = softmax(&block_theta, self.liquidity);
            for (&i, p) in block.iter().zip(normalized) {
                if let Some(slot) = prices.get_mut(i) {
                    *slot = p;
                }
            }
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_for_complementary_prices() {
        let b = 100.0;
        let mut p = 0.05;
        while p <= 0.95 + 1e-9 {
            let prices = vec![p, 1.0 - p];
            let back = theta_to_prices(&prices_to_theta(&prices, b), b);
            for (orig, got) in prices.iter().zip(back.iter()) {
                assert!((orig - got).abs() < 0.01, "{orig} -> {got}");
            }
            p += 0.05;
        }
    }

    #[test]
    fn mispricing_of_fair_and_overround_markets() {
        assert_eq!(compute_mispricing(&[0.4, 0.6]), 0.0);
        assert!((compute_mispricing(&[0.55, 0.55]) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn zero_price_is_floored() {
        let theta = prices_to_theta(&[0.0, 1.0], 1.0);
        assert!(theta[0].is_finite());
        assert!((theta[0] - PROBABILITY_FLOOR.ln()).abs() < 1e-9);
    }

    #[test]
    fn global_softmax_renormalizes() {
        let state = MarketState::from_prices(&[0.55, 0.53], 10.0);
        let prices = state.prices();
        assert!((prices.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((prices[0] - 0.55 / 1.08).abs() < 1e-9);
    }

    #[test]
    fn global_mass_spreads_over_every_market() {
        let state = MarketState::from_prices(&[0.3, 0.7, 0.7, 0.3], 100.0).with_mass(2.0);
        let prices = state.prices();

        assert!((prices.iter().sum::<f64>() - 2.0).abs() < 1e-9);
        for (got, want) in prices.iter().zip([0.3, 0.7, 0.7, 0.3]) {
            assert!((got - want).abs() < 1e-9, "{prices:?}");
        }
    }

    #[test]
    fn per_block_softmax_keeps_each_market_normalized() {
        let state = MarketState::from_prices(&[0.6, 0.6, 0.3, 0.3], 5.0)
            .with_blocks(vec![vec![0, 1], vec![2, 3]]);
        let prices = state.prices();

        for p in &prices {
            assert!((p - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn uncovered_security_keeps_raw_price() {
        let state = MarketState::from_prices(&[0.6, 0.6, 0.2], 5.0).with_blocks(vec![vec![0, 1]]);
        let prices = state.prices();
        assert!((prices[2] - 0.2).abs() < 1e-9);
    }
}
