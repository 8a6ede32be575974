//! Solver backends implementing [`crate::port::Solver`].

pub mod branch_bound;
#[cfg(feature = "highs")]
pub mod highs;

pub use branch_bound::{BranchBoundSolver, SolverConfig};
#[cfg(feature = "highs")]
pub use highs::HighsSolver;
