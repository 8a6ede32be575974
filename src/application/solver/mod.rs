//! Optimization pipeline: vertex initialization, LMSR math and barrier
//! Frank-Wolfe.

pub mod bregman;
pub mod frank_wolfe;
pub mod init;

pub use frank_wolfe::{FrankWolfe, FrankWolfeConfig, FrankWolfeResult, StopReason};
pub use init::{initialize, InitResult};
