//! Price ticks in, arbitrage opportunities out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{GroupId, InstrumentId, MarketId};

/// One observed price for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Instrument the price belongs to.
    pub instrument_id: InstrumentId,
    /// Observed price in [0, 1].
    pub price: Decimal,
    /// Observation time; defaults to receipt time when absent.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PriceTick {
    /// Create a tick stamped with the current time.
    pub fn new(instrument_id: impl Into<InstrumentId>, price: Decimal) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            timestamp: Utc::now(),
        }
    }
}

/// Direction of a trade leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Buy the security.
    Buy,
    /// Sell the security.
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// One leg of the recommended trade vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument to trade.
    pub instrument_id: InstrumentId,
    /// Buy or sell.
    pub side: TradeSide,
    /// Quantity, scaled by the configured position size.
    pub quantity: Decimal,
    /// Current market price.
    pub price: Decimal,
}

/// Result of analyzing a group whose prices admit a guaranteed profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Group the opportunity was found in.
    pub group_id: GroupId,
    /// Markets of the group.
    pub market_ids: Vec<MarketId>,
    /// Arbitrage-free marginal prices found by the optimizer.
    pub mu_optimal: Vec<f64>,
    /// Bregman divergence between `mu_optimal` and the market prices.
    pub divergence: f64,
    /// Frank-Wolfe gap at the final iterate.
    pub gap: f64,
    /// Lower bound on profit: `max(0, divergence - gap)`.
    pub guaranteed_profit: f64,
    /// Guaranteed profit minus execution cost.
    pub net_profit: f64,
    /// Trade legs moving prices toward `mu_optimal`.
    pub trades: Vec<Trade>,
    /// Whether the decision rule approved the trade.
    pub should_trade: bool,
    /// Human-readable decision reason.
    pub reason: String,
    /// Detection time.
    pub detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Total notional of all legs: `sum(quantity * price)`.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.trades.iter().map(|t| t.quantity * t.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn tick_without_timestamp_parses() {
        let tick: PriceTick =
            serde_json::from_str(r#"{"instrument_id":"a-yes","price":"0.42"}"#).unwrap();

        assert_eq!(tick.instrument_id.as_str(), "a-yes");
        assert_eq!(tick.price, dec!(0.42));
    }

    #[test]
    fn notional_sums_legs() {
        let opportunity = ArbitrageOpportunity {
            group_id: GroupId::from("g"),
            market_ids: vec![MarketId::new("m")],
            mu_optimal: vec![0.5, 0.5],
            divergence: 0.1,
            gap: 0.01,
            guaranteed_profit: 0.09,
            net_profit: 0.07,
            trades: vec![
                Trade {
                    instrument_id: InstrumentId::new("yes"),
                    side: TradeSide::Sell,
                    quantity: dec!(10),
                    price: dec!(0.6),
                },
                Trade {
                    instrument_id: InstrumentId::new("no"),
                    side: TradeSide::Sell,
                    quantity: dec!(5),
                    price: dec!(0.5),
                },
            ],
            should_trade: true,
            reason: "approved".into(),
            detected_at: Utc::now(),
        };

        assert_eq!(opportunity.notional(), dec!(8.5));
        assert_eq!(TradeSide::Sell.to_string(), "sell");
    }
}
