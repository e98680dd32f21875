//! Error types shared across Saga crates.

use thiserror::Error;

/// Top-level error type for Saga operations that cross crate boundaries.
#[derive(Debug, Error)]
pub enum SagaError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
