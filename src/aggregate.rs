//! Recompute centroids from their assigned points.
//!
//! [`Aggregator::reduce`] handles one centroid key; [`AggregationTask`] wraps
//! it with the lifecycle of one task of a round: reduce every key of its
//! partition, then flush the new centroids to its checkpoint partition once.

use std::path::PathBuf;
use std::time::Instant;

use log::debug;

use crate::checkpoint::CheckpointWriter;
use crate::config::AggregatorConfig;
use crate::error::{Error, Result};
use crate::point::{Centroid, DataPoint, Tolerance};
use crate::tally::ConvergenceTally;
use crate::vector::Vector;

/// Sink for the `(centroid, point)` pairs fed into the next round.
pub trait Output {
    /// Emit one pair.
    fn write(&mut self, centroid: &Centroid, point: DataPoint) -> Result<()>;
}

impl Output for Vec<(Centroid, DataPoint)> {
    fn write(&mut self, centroid: &Centroid, point: DataPoint) -> Result<()> {
        self.push((centroid.clone(), point));
        Ok(())
    }
}

/// Arithmetic mean of the point vectors.
///
/// The sum runs in `f64` in input order and is narrowed to `f32` after the
/// division, so coordinates of very different magnitude do not cancel out.
pub fn mean(previous: &Centroid, points: &[DataPoint]) -> Result<Vector> {
    let first = points
        .first()
        .ok_or(Error::EmptyGroup { id: previous.id() })?;
    let dim = first.vector().dim();
    let mut sum = vec![0.0f64; dim];
    for point in points {
        let values = point.vector().as_slice();
        if values.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: values.len(),
            });
        }
        for (s, &v) in sum.iter_mut().zip(values) {
            *s += v as f64;
        }
    }
    let count = points.len() as f64;
    Ok(Vector::new(
        sum.into_iter().map(|s| (s / count) as f32).collect(),
    ))
}

/// Reduce logic shared by every key of one task.
#[derive(Debug)]
pub struct Aggregator {
    tolerance: Tolerance,
    centers: Vec<Centroid>,
    tally: ConvergenceTally,
}

impl Aggregator {
    /// Create an aggregator with an empty centroid buffer and tally.
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            centers: Vec::new(),
            tally: ConvergenceTally::new(),
        }
    }

    /// Recompute the centroid of one cluster.
    ///
    /// Writes every point back to `output` keyed by the new centroid, records
    /// the new centroid for the checkpoint and counts the convergence vote,
    /// which is also returned. An empty group or a dimension mismatch fails
    /// before anything is written or recorded.
    pub fn reduce<I, O>(&mut self, previous: &Centroid, points: I, output: &mut O) -> Result<bool>
    where
        I: IntoIterator<Item = DataPoint>,
        O: Output + ?Sized,
    {
        let points: Vec<DataPoint> = points.into_iter().collect();
        let position = mean(previous, &points)?;
        let (centroid, converged) = Centroid::update(position, previous, self.tolerance)?;

        let count = points.len();
        for point in points {
            output.write(&centroid, point)?;
        }
        if converged {
            self.tally.increment(1);
        }
        debug!(
            "centroid {}: {} points, converged: {}",
            centroid.id(),
            count,
            converged
        );
        self.centers.push(centroid);
        Ok(converged)
    }

    /// Centroids produced so far, in reduce order.
    pub fn centers(&self) -> &[Centroid] {
        &self.centers
    }

    /// Convergence votes counted so far.
    pub fn tally(&self) -> ConvergenceTally {
        self.tally
    }

    /// Split into the produced centroids and the tally.
    pub fn into_parts(self) -> (Vec<Centroid>, ConvergenceTally) {
        (self.centers, self.tally)
    }
}

/// What a finished task hands back to its round.
#[derive(Debug)]
pub struct TaskReport {
    /// Checkpoint partition written by the task.
    pub partition: usize,
    /// Partition file.
    pub path: PathBuf,
    /// Centroids written to the partition.
    pub centroids: Vec<Centroid>,
    /// Convergence votes of the task.
    pub tally: ConvergenceTally,
}

/// One aggregation task: a disjoint subset of the centroid keys of a round.
///
/// A task is a pure function of its groups. Dropping it without calling
/// [`AggregationTask::cleanup`], e.g. after a failed reduce, writes nothing,
/// so a retry can start again from scratch.
#[derive(Debug)]
pub struct AggregationTask {
    partition: usize,
    aggregator: Aggregator,
    writer: CheckpointWriter,
}

impl AggregationTask {
    /// Task owning checkpoint partition `partition`.
    pub fn new(partition: usize, config: &AggregatorConfig) -> Self {
        Self {
            partition,
            aggregator: Aggregator::new(config.tolerance),
            writer: CheckpointWriter::new(&config.checkpoint, partition),
        }
    }

    /// Reduce one centroid key.
    pub fn reduce<I, O>(&mut self, previous: &Centroid, points: I, output: &mut O) -> Result<bool>
    where
        I: IntoIterator<Item = DataPoint>,
        O: Output + ?Sized,
    {
        self.aggregator.reduce(previous, points, output)
    }

    /// Reduce every group of the task, in order.
    pub fn run<G, P, O>(&mut self, groups: G, output: &mut O) -> Result<()>
    where
        G: IntoIterator<Item = (Centroid, P)>,
        P: IntoIterator<Item = DataPoint>,
        O: Output + ?Sized,
    {
        let start = Instant::now();
        let mut keys = 0;
        for (previous, points) in groups {
            self.reduce(&previous, points, output)?;
            keys += 1;
        }
        debug!(
            "task {}: reduced {} keys in {} s",
            self.partition,
            keys,
            start.elapsed().as_secs_f32()
        );
        Ok(())
    }

    /// Convergence votes counted so far.
    pub fn tally(&self) -> ConvergenceTally {
        self.aggregator.tally()
    }

    /// Flush the produced centroids to the task's checkpoint partition.
    pub fn cleanup(self) -> Result<TaskReport> {
        let (centroids, tally) = self.aggregator.into_parts();
        let path = self.writer.write(&centroids)?;
        Ok(TaskReport {
            partition: self.partition,
            path,
            centroids,
            tally,
        })
    }
}
