//! Pure helpers turning prices and optimizer output into engine artifacts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::config::EngineConfig;
use crate::domain::group::MarketGroup;
use crate::domain::market_state::{MarketState, Normalization};
use crate::domain::opportunity::{Trade, TradeSide};

/// Decimal places kept on trade quantities.
pub const QUANTITY_DP: u32 = 4;

/// Convert boundary prices to floats for the optimizer.
#[must_use]
pub fn to_probabilities(prices: &[Decimal]) -> Vec<f64> {
    prices.iter().map(|p| p.to_f64().unwrap_or(0.0)).collect()
}

/// LMSR state for a group under the configured normalization.
///
/// The global softmax carries one unit of mass per market so that a
/// consistently priced group lies on its own polytope.
#[must_use]
pub fn market_state(group: &MarketGroup, prices: &[f64], config: &EngineConfig) -> MarketState {
    let state = MarketState::from_prices(prices, config.liquidity_param);
    match config.normalization {
        Normalization::Global => state.with_mass(group.blocks.len().max(1) as f64),
        Normalization::PerMarket => state.with_blocks(group.blocks.clone()),
    }
}

/// One leg per security whose optimal price differs from the market price by
/// more than `trade_threshold`.
///
/// Buys securities the market underprices relative to `mu`, sells the rest.
#[must_use]
pub fn build_trades(
    group: &MarketGroup,
    mu: &[f64],
    prices: &[Decimal],
    config: &EngineConfig,
) -> Vec<Trade> {
    group
        .instruments
        .iter()
        .zip(mu)
        .zip(prices)
        .filter_map(|((instrument, &target), &price)| {
            let diff = target - price.to_f64().unwrap_or(0.0);
            if diff.abs() <= config.trade_threshold {
                return None;
            }
            let quantity = Decimal::try_from(diff.abs() * config.position_scale)
                .unwrap_or(Decimal::ZERO)
                .round_dp(QUANTITY_DP);
            Some(Trade {
                instrument_id: instrument.clone(),
                side: if diff > 0.0 {
                    TradeSide::Buy
                } else {
                    TradeSide::Sell
                },
                quantity,
                price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::group::MarketDefinition;

    fn group() -> MarketGroup {
        MarketGroup::from_markets(vec![MarketDefinition::binary("m", "yes", "no")], vec![])
            .unwrap()
    }

    #[test]
    fn trades_follow_price_gap() {
        let trades = build_trades(
            &group(),
            &[0.5, 0.5],
            &[dec!(0.55), dec!(0.40)],
            &EngineConfig::default(),
        );

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, TradeSide::Sell);
        assert_eq!(trades[0].quantity, dec!(5));
        assert_eq!(trades[0].price, dec!(0.55));
        assert_eq!(trades[1].side, TradeSide::Buy);
        assert_eq!(trades[1].quantity, dec!(10));
    }

    #[test]
    fn small_gaps_are_not_traded() {
        let trades = build_trades(
            &group(),
            &[0.505, 0.495],
            &[dec!(0.5), dec!(0.5)],
            &EngineConfig::default(),
        );
        assert!(trades.is_empty());
    }

    #[test]
    fn global_normalization_matches_fair_correlated_prices() {
        let group = MarketGroup::from_markets(
            vec![
                MarketDefinition::binary("a", "a-yes", "a-no"),
                MarketDefinition::binary("b", "b-yes", "b-no"),
            ],
            vec![],
        )
        .unwrap();
        let prices = [0.3, 0.7, 0.7, 0.3];

        let implied = market_state(&group, &prices, &EngineConfig::default()).prices();

        for (got, want) in implied.iter().zip(prices) {
            assert!((got - want).abs() < 1e-9, "{implied:?}");
        }
    }

    #[test]
    fn per_market_normalization_uses_blocks() {
        let config = EngineConfig {
            normalization: Normalization::PerMarket,
            ..EngineConfig::default()
        };
        let state = market_state(&group(), &[0.6, 0.6], &config);

        assert_eq!(state.prices(), vec![0.5, 0.5]);
    }
}
