//! Infrastructure configuration modules.

pub mod engine;
pub mod logging;
pub mod service;
pub mod settings;
