//! Aggregation round configuration.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::point::Tolerance;

/// Settings shared by every aggregation task of a round.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Checkpoint directory, replaced by each round.
    pub checkpoint: PathBuf,
    /// When a centroid counts as converged.
    pub tolerance: Tolerance,
    /// Number of aggregation tasks, i.e. checkpoint partitions.
    pub tasks: usize,
}

impl AggregatorConfig {
    /// Create a config with exact convergence and a single task.
    pub fn new(checkpoint: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint: checkpoint.into(),
            tolerance: Tolerance::default(),
            tasks: 1,
        }
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the number of aggregation tasks.
    pub fn with_tasks(mut self, tasks: usize) -> Self {
        self.tasks = tasks;
        self
    }

    /// Reject settings no round can run with.
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "checkpoint path must not be empty".to_string(),
            ));
        }
        if self.tasks < 1 {
            return Err(Error::InvalidConfig(
                "tasks must be greater than 0".to_string(),
            ));
        }
        if let Tolerance::Epsilon(epsilon) = self.tolerance {
            Tolerance::new(epsilon)?;
        }
        Ok(())
    }
}
