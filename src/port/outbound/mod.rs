//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the engine's infrastructure dependencies: the
//! binary solver backend and event notifications.

pub mod notifier;
pub mod solver;
