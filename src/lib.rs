//! Polyedge - combinatorial arbitrage detection for prediction markets.
//!
//! Markets linked by logical relations ("A implies B", "exactly one of")
//! can be jointly mispriced even when each market looks fine on its own.
//! Polyedge projects observed prices onto the arbitrage-free polytope of a
//! market group with a barrier Frank-Wolfe optimizer and reports a
//! guaranteed-profit bound when the projection is far enough away.
//!
//! # Architecture
//!
//! - **`domain`** - Constraints, vertices, market groups, LMSR state
//! - **`port`** - Solver and notifier traits
//! - **`adapter`** - Branch-and-bound (and optional HiGHS) solvers, CLI
//! - **`application`** - Initialization, Frank-Wolfe, decision rule, engine
//! - **`infrastructure`** - TOML configuration and logging
//!
//! # Features
//!
//! - `highs` - Exact HiGHS-backed solver via `good_lp`
//!
//! # Example
//!
//! ```no_run
//! use polyedge::application::engine::{ArbitrageEngine, EngineConfig};
//! use polyedge::domain::group::MarketDefinition;
//! use polyedge::domain::opportunity::PriceTick;
//! use rust_decimal_macros::dec;
//!
//! let engine = ArbitrageEngine::new(EngineConfig::default()).unwrap();
//! let id = engine
//!     .add_binary_market(MarketDefinition::binary("rain", "rain-yes", "rain-no"))
//!     .unwrap();
//! engine.on_price(&PriceTick::new("rain-yes", dec!(0.55))).unwrap();
//! engine.on_price(&PriceTick::new("rain-no", dec!(0.52))).unwrap();
//! let outcome = engine.analyze_group(&id).unwrap();
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
