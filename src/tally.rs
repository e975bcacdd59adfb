//! Round-scoped convergence counter.

use std::iter::Sum;

/// Number of centroids that stopped moving in one round.
///
/// Every aggregation task owns its own tally; the round collects them with
/// [`ConvergenceTally::merge`] once all tasks are done, the same way a
/// distributed counter is summed by the execution framework.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceTally(u64);

impl ConvergenceTally {
    /// A tally with no votes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` votes.
    pub fn increment(&mut self, n: u64) {
        self.0 += n;
    }

    /// Current number of votes.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Fold the votes of another task into this one.
    pub fn merge(&mut self, other: ConvergenceTally) {
        self.0 += other.0;
    }
}

impl Sum for ConvergenceTally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |mut acc, tally| {
            acc.merge(tally);
            acc
        })
    }
}

#[cfg(test)]
mod test {
    use super::ConvergenceTally;

    #[test]
    fn test_tally() {
        let mut tally = ConvergenceTally::new();
        assert_eq!(tally.value(), 0);
        tally.increment(1);
        tally.increment(2);
        assert_eq!(tally.value(), 3);

        let mut other = ConvergenceTally::new();
        other.increment(4);
        tally.merge(other);
        assert_eq!(tally.value(), 7);
    }

    #[test]
    fn test_sum() {
        let tallies = (0..5).map(|i| {
            let mut t = ConvergenceTally::new();
            t.increment(i);
            t
        });
        assert_eq!(tallies.sum::<ConvergenceTally>().value(), 10);
    }
}
