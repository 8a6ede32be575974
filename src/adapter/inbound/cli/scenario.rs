//! Scenario files: market groups and seed prices for the CLI.
//!
//! ```toml
//! [[groups]]
//! name = "election"
//! kind = "correlated"
//! markets = [
//!     { id = "win-state", outcomes = ["win-state-yes", "win-state-no"] },
//!     { id = "win-national", outcomes = ["win-national-yes", "win-national-no"] },
//! ]
//! relations = [{ type = "implies", if_yes = "win-state", then_yes = "win-national" }]
//!
//! [prices]
//! win-state-yes = "0.60"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::engine::ArbitrageEngine;
use crate::domain::group::MarketDefinition;
use crate::domain::id::{GroupId, InstrumentId};
use crate::domain::opportunity::PriceTick;
use crate::domain::relation::RelationKind;

/// How a scenario group is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Binary,
    Multi,
    Correlated,
}

/// One group in a scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioGroup {
    /// Display name.
    pub name: String,
    pub kind: GroupKind,
    pub markets: Vec<MarketDefinition>,
    #[serde(default)]
    pub relations: Vec<RelationKind>,
}

/// Parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub groups: Vec<ScenarioGroup>,
    /// Initial price per instrument.
    #[serde(default)]
    pub prices: BTreeMap<String, Decimal>,
}

/// A scenario group after registration.
#[derive(Debug, Clone)]
pub struct RegisteredGroup {
    pub name: String,
    pub id: GroupId,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parse scenario TOML.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Register every group with the engine, in file order.
    pub fn register(&self, engine: &ArbitrageEngine) -> Result<Vec<RegisteredGroup>> {
        self.groups
            .iter()
            .map(|group| {
                let id = register_group(engine, group)
                    .with_context(|| format!("failed to register group '{}'", group.name))?;
                Ok(RegisteredGroup {
                    name: group.name.clone(),
                    id,
                })
            })
            .collect()
    }

    /// Feed the seed prices to the engine.
    pub fn apply_prices(&self, engine: &ArbitrageEngine) -> Result<()> {
        for (instrument, price) in &self.prices {
            engine
                .on_price(&PriceTick::new(instrument.as_str(), *price))
                .with_context(|| format!("invalid price for {instrument}"))?;
        }
        Ok(())
    }
}

fn register_group(engine: &ArbitrageEngine, group: &ScenarioGroup) -> Result<GroupId> {
    let id = match group.kind {
        GroupKind::Binary => {
            let [market] = group.markets.as_slice() else {
                bail!("binary group needs exactly one market");
            };
            engine.add_binary_market(market.clone())?
        }
        GroupKind::Multi => {
            let [market] = group.markets.as_slice() else {
                bail!("multi-outcome group needs exactly one market");
            };
            let instruments: Vec<InstrumentId> = market.outcomes.clone();
            engine.add_multi_outcome_market(market.id.clone(), instruments)?
        }
        GroupKind::Correlated => {
            engine.add_correlated_markets(group.markets.clone(), group.relations.clone())?
        }
    };
    Ok(id)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::application::engine::EngineConfig;

    const SCENARIO: &str = r#"
        [[groups]]
        name = "coin"
        kind = "binary"
        markets = [{ id = "coin", outcomes = ["heads", "tails"] }]

        [[groups]]
        name = "linked"
        kind = "correlated"
        markets = [
            { id = "a", outcomes = ["a-yes", "a-no"] },
            { id = "b", outcomes = ["b-yes", "b-no"] },
        ]
        relations = [{ type = "implies", if_yes = "a", then_yes = "b" }]

        [prices]
        heads = "0.5"
        tails = "0.5"
    "#;

    #[test]
    fn parses_groups_and_prices() {
        let scenario = Scenario::parse(SCENARIO).unwrap();

        assert_eq!(scenario.groups.len(), 2);
        assert_eq!(scenario.groups[0].kind, GroupKind::Binary);
        assert_eq!(scenario.groups[1].relations.len(), 1);
        assert_eq!(scenario.prices.get("heads"), Some(&dec!(0.5)));
    }

    #[test]
    fn registers_every_group() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let engine = ArbitrageEngine::new(EngineConfig::default()).unwrap();

        let registered = scenario.register(&engine).unwrap();
        scenario.apply_prices(&engine).unwrap();

        assert_eq!(registered.len(), 2);
        assert_eq!(registered[1].name, "linked");
        assert_eq!(engine.group_count(), 2);
    }

    #[test]
    fn binary_group_with_two_markets_is_rejected() {
        let scenario = Scenario::parse(
            r#"
            [[groups]]
            name = "bad"
            kind = "binary"
            markets = [
                { id = "a", outcomes = ["a-yes", "a-no"] },
                { id = "b", outcomes = ["b-yes", "b-no"] },
            ]
            "#,
        )
        .unwrap();
        let engine = ArbitrageEngine::new(EngineConfig::default()).unwrap();

        assert!(scenario.register(&engine).is_err());
    }
}
