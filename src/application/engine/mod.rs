//! Arbitrage engine: group registry, analysis pipeline and background service.
//!
//! - [`config`] - Validated engine tuning
//! - [`orchestrator`] - [`ArbitrageEngine`] and per-group analysis
//! - [`service`] - Tick-driven background loop
//! - `analyzer` - Price conversion and trade construction
//! - `state` - Per-group lifecycle state

mod analyzer;
pub mod config;
pub mod orchestrator;
pub mod service;
mod state;

pub use config::EngineConfig;
pub use orchestrator::{AnalysisOutcome, ArbitrageEngine};
pub use service::{EngineHandle, EngineService, ServiceConfig};
pub use state::GroupStatus;
