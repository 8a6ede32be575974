#![allow(dead_code)]

pub mod notifier;
pub mod solver;

use polyedge::application::engine::{ArbitrageEngine, EngineConfig};
use polyedge::domain::group::MarketDefinition;
use polyedge::domain::id::GroupId;
use polyedge::domain::opportunity::PriceTick;
use polyedge::domain::relation::RelationKind;
use rust_decimal::Decimal;

pub fn engine() -> ArbitrageEngine {
    ArbitrageEngine::new(EngineConfig::default()).expect("default config is valid")
}

/// A YES/NO market whose instruments are `{id}-yes` and `{id}-no`.
pub fn binary(id: &str) -> MarketDefinition {
    MarketDefinition::binary(id, format!("{id}-yes"), format!("{id}-no"))
}

pub fn implies(if_yes: &str, then_yes: &str) -> RelationKind {
    RelationKind::Implies {
        if_yes: if_yes.into(),
        then_yes: then_yes.into(),
    }
}

pub fn price(engine: &ArbitrageEngine, instrument: &str, price: Decimal) -> Vec<GroupId> {
    engine
        .on_price(&PriceTick::new(instrument, price))
        .expect("valid price")
}

/// Price both sides of a binary market built with [`binary`].
pub fn price_binary(engine: &ArbitrageEngine, id: &str, yes: Decimal, no: Decimal) {
    price(engine, &format!("{id}-yes"), yes);
    price(engine, &format!("{id}-no"), no);
}
