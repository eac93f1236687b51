//! Error types for the design search engine.

use thiserror::Error;

/// Errors raised while setting up or running the ant colony search.
#[derive(Error, Debug)]
pub enum AcoError {
    /// Configuration rejected before any run starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or inconsistent design problem
    #[error("Problem error: {0}")]
    Problem(String),

    /// An ant hit the configured construction ceiling without a valid path
    #[error("Ant {ant} found no valid path after {attempts} extra attempts")]
    ConstructionExhausted { ant: usize, attempts: usize },

    /// Non-finite or otherwise unusable numeric state
    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AcoError {
    pub fn config(message: impl Into<String>) -> Self {
        AcoError::Config(message.into())
    }

    pub fn problem(message: impl Into<String>) -> Self {
        AcoError::Problem(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        AcoError::Numerical(message.into())
    }
}

pub type AcoResult<T> = Result<T, AcoError>;
