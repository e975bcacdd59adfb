//! Errors raised while aggregating centroids.

use std::path::PathBuf;

use thiserror::Error;

use crate::point::ClusterId;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Vector arithmetic on vectors of different lengths.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimensionality of the left operand.
        expected: usize,
        /// Dimensionality of the right operand.
        found: usize,
    },

    /// Division of a vector by zero.
    #[error("divide by zero")]
    DivideByZero,

    /// A centroid key reached the aggregator without any point.
    #[error("centroid {id} has no assigned points")]
    EmptyGroup {
        /// Identity of the empty cluster.
        id: ClusterId,
    },

    /// The same centroid key appears twice in one round.
    #[error("centroid {id} is grouped more than once")]
    DuplicateKey {
        /// Identity of the repeated cluster.
        id: ClusterId,
    },

    /// A point refers to a centroid that is not in the checkpoint.
    #[error("centroid {id} is not in the checkpoint")]
    UnknownCentroid {
        /// Identity that could not be resolved.
        id: ClusterId,
    },

    /// Invalid configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Convergence tolerance must be finite and non-negative.
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f32),

    /// Checkpoint file cannot be decoded.
    #[error("corrupt checkpoint {}: {message}", path.display())]
    CorruptCheckpoint {
        /// Offending partition file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// Malformed text input.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// Storage failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
