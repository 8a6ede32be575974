//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to plug solver backends and
//! notification sinks into the engine.
//!
//! # Available Ports
//!
//! - [`Solver`] - Binary feasibility search and linear minimization
//! - [`Notifier`] - Event notifications (logging, custom sinks)

pub mod outbound;

pub use outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier, OpportunityEvent,
};
pub use outbound::solver::{FeasibilityResult, LpProblem, LpSolution, SolutionStatus, Solver};
