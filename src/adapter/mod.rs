//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Command-line entry points driving the engine
//! - [`outbound`] - Solver backends

pub mod inbound;
pub mod outbound;
