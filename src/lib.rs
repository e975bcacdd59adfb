//! Centroid aggregation for map/reduce k-means.
//!
//! Each k-means round assigns points to their nearest centroid (not part of
//! this crate) and then aggregates: every cluster is reduced to the mean of
//! its points, the points are re-emitted keyed by the new centroid, converged
//! clusters are counted, and the new centroid set is checkpointed for the next
//! round.
//!
//! - [`aggregate`]: reduce one cluster, and the lifecycle of a task
//! - [`checkpoint`]: partitioned, replace-on-write centroid checkpoints
//! - [`round`]: run all tasks of a round and sum their convergence votes

pub mod aggregate;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod point;
pub mod round;
pub mod simd;
pub mod tally;
pub mod text;
pub mod vector;

pub use aggregate::{AggregationTask, Aggregator, Output, TaskReport};
pub use checkpoint::{Checkpoint, CheckpointWriter, Movement, Staging};
pub use config::AggregatorConfig;
pub use error::{Error, Result};
pub use point::{Centroid, ClusterId, DataPoint, Tolerance};
pub use round::{Round, RoundOutcome};
pub use tally::ConvergenceTally;
pub use vector::Vector;
