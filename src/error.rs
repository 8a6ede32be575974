//! Crate-level error types.
//!
//! Domain failures live in [`DomainError`]; this module adds the
//! configuration layer on top and folds both into [`Error`].

use thiserror::Error;

use crate::domain::error::DomainError;

/// A configuration file or engine parameter that cannot be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A section or key the engine cannot run without.
    #[error("config is missing `{field}`")]
    MissingField { field: &'static str },

    /// A parameter outside its accepted range.
    #[error("`{field}` rejected: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("cannot read config file")]
    ReadFile(#[source] std::io::Error),

    #[error("config is not valid TOML")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type Result<T> = std::result::Result<T, Error>;
