//! Error types
//!
//! Contract violations are fatal to the tick that produced them. Domain
//! misses (no root, no aligned cloud) are plain `Option`/empty results and
//! never show up here.

use thiserror::Error;

/// A computed value broke an invariant of the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("non-finite {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
    #[error("inverted box on the {axis} axis: {lo} > {hi}")]
    InvertedBox { axis: char, lo: f64, hi: f64 },
    #[error("{what} overflowed")]
    Overflow { what: &'static str },
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Anything that stops a session from starting or running.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

/// Pass `value` through if it is finite.
#[inline]
pub fn finite(what: &'static str, value: f64) -> Result<f64, ContractViolation> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ContractViolation::NonFinite { what, value })
    }
}
