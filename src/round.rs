//! Run one aggregation round in process.
//!
//! Keys are hash-partitioned over `tasks` aggregation tasks. Each task reduces
//! its keys, writes its own partition of a staged checkpoint and reports its
//! tally; the round then sums the tallies and swaps the staged checkpoint in.
//! Tasks share nothing but the read-only config.

use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::aggregate::{AggregationTask, TaskReport};
use crate::checkpoint::{Checkpoint, Movement, partition_of};
use crate::config::AggregatorConfig;
use crate::error::{Error, Result};
use crate::point::{Centroid, ClusterId, DataPoint};
use crate::tally::ConvergenceTally;
use crate::text::read_assignments;

/// Points of one cluster, keyed by the centroid of the previous round.
pub type Group = (Centroid, Vec<DataPoint>);

/// Group assignment output under the centroids of `checkpoint`.
///
/// Every centroid of the checkpoint gets a group, even one without points,
/// so that an empty cluster fails the round instead of silently vanishing.
pub fn group_assignments<I>(checkpoint: &Checkpoint, pairs: I) -> Result<Vec<Group>>
where
    I: IntoIterator<Item = (ClusterId, DataPoint)>,
{
    let mut groups: BTreeMap<ClusterId, Vec<DataPoint>> = checkpoint
        .centroids()
        .iter()
        .map(|c| (c.id(), Vec::new()))
        .collect();
    for (id, point) in pairs {
        groups
            .get_mut(&id)
            .ok_or(Error::UnknownCentroid { id })?
            .push(point);
    }
    groups
        .into_iter()
        .map(|(id, points)| {
            let centroid = checkpoint
                .get(id)
                .ok_or(Error::UnknownCentroid { id })?
                .clone();
            Ok((centroid, points))
        })
        .collect()
}

/// Result of a completed round.
#[derive(Debug)]
pub struct RoundOutcome {
    /// `(new centroid, point)` pairs for the next assignment phase.
    pub pairs: Vec<(Centroid, DataPoint)>,
    /// The new centroid set, as written to the checkpoint.
    pub checkpoint: Checkpoint,
    /// Sum of the convergence votes of all tasks.
    pub tally: ConvergenceTally,
}

impl RoundOutcome {
    /// Number of clusters in the round.
    pub fn clusters(&self) -> usize {
        self.checkpoint.len()
    }

    /// True if every cluster voted converged.
    ///
    /// Retried tasks may vote twice; use [`Checkpoint::compare`] when that
    /// matters.
    pub fn is_converged(&self) -> bool {
        self.tally.value() >= self.clusters() as u64
    }
}

/// One aggregation round.
#[derive(Debug, Clone)]
pub struct Round {
    config: AggregatorConfig,
}

fn run_task(
    partition: usize,
    groups: Vec<Group>,
    config: &AggregatorConfig,
) -> Result<(TaskReport, Vec<(Centroid, DataPoint)>)> {
    let mut task = AggregationTask::new(partition, config);
    let mut output: Vec<(Centroid, DataPoint)> =
        Vec::with_capacity(groups.iter().map(|(_, p)| p.len()).sum());
    task.run(groups, &mut output)?;
    Ok((task.cleanup()?, output))
}

impl Round {
    /// Create a round, rejecting an unusable config.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Settings of the round.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Reduce every group and replace the checkpoint.
    ///
    /// Tasks write to a staging directory next to the checkpoint, which
    /// replaces it only once every task succeeded. If any task fails, the
    /// round fails, the staged partitions are discarded and the previous
    /// checkpoint is kept as is.
    pub fn run(&self, groups: Vec<Group>) -> Result<RoundOutcome> {
        let start = Instant::now();
        let tasks = self.config.tasks;

        let mut seen = HashSet::with_capacity(groups.len());
        let mut shards: Vec<Vec<Group>> = (0..tasks).map(|_| Vec::new()).collect();
        for (centroid, points) in groups {
            if !seen.insert(centroid.id()) {
                return Err(Error::DuplicateKey { id: centroid.id() });
            }
            shards[partition_of(centroid.id(), tasks)].push((centroid, points));
        }
        debug!("round: {} keys over {} tasks", seen.len(), tasks);

        let staging = Checkpoint::stage(&self.config.checkpoint)?;
        let mut task_config = self.config.clone();
        task_config.checkpoint = staging.path().to_path_buf();

        #[cfg(feature = "perf")]
        let results: Vec<_> = shards
            .into_iter()
            .enumerate()
            .map(|(partition, shard)| run_task(partition, shard, &task_config))
            .collect();
        #[cfg(not(feature = "perf"))]
        let results: Vec<_> = shards
            .into_par_iter()
            .enumerate()
            .map(|(partition, shard)| run_task(partition, shard, &task_config))
            .collect();

        let mut pairs = Vec::new();
        let mut centroids = Vec::with_capacity(seen.len());
        let mut tally = ConvergenceTally::new();
        for result in results {
            let (report, output) = result?;
            tally.merge(report.tally);
            centroids.extend(report.centroids);
            pairs.extend(output);
        }
        let checkpoint = Checkpoint::new(centroids)?;
        staging.commit()?;

        info!(
            "round: converged {}/{} in {} s",
            tally.value(),
            checkpoint.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(RoundOutcome {
            pairs,
            checkpoint,
            tally,
        })
    }

    /// Run the round over assignment output in the text format.
    ///
    /// The points are grouped under the centroids of the current checkpoint,
    /// which is then replaced. Returns the outcome together with the movement
    /// of every centroid against the replaced checkpoint.
    pub fn run_assignments<R: BufRead>(&self, input: R) -> Result<(RoundOutcome, Movement)> {
        let previous = Checkpoint::read(&self.config.checkpoint)?;
        let groups = group_assignments(&previous, read_assignments(input)?)?;
        let outcome = self.run(groups)?;
        let movement = outcome
            .checkpoint
            .compare(&previous, self.config.tolerance)?;
        Ok((outcome, movement))
    }
}
