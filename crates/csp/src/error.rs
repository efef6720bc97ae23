//! Error types for policy mutation and header parsing.

use thiserror::Error;

use crate::flag::Flag;

/// Errors raised while mutating a policy or loading a header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A flag that requires at least one value received none.
    #[error("{flag} requires at least one value")]
    MissingValues { flag: Flag },

    /// A flag that accepts no values received some.
    #[error("{flag} does not accept any values, got: {values}")]
    UnexpectedValues { flag: Flag, values: String },

    /// A flag value failed its charset or whitelist check.
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: Flag, value: String },

    /// A header rule opened with a tag that names neither a flag nor a
    /// directive.
    #[error("unknown directive: {0}")]
    UnknownDirective(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
