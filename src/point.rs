//! Data points and centroids.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::vector::Vector;

/// Stable identity of a cluster across rounds.
pub type ClusterId = u32;

/// One labeled input record.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    vector: Vector,
    label: Option<u64>,
}

impl DataPoint {
    /// Create an unlabeled point.
    pub fn new(vector: Vector) -> Self {
        Self {
            vector,
            label: None,
        }
    }

    /// Create a labeled point.
    pub fn with_label(vector: Vector, label: u64) -> Self {
        Self {
            vector,
            label: Some(label),
        }
    }

    /// Position of the point.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Optional record label.
    pub fn label(&self) -> Option<u64> {
        self.label
    }

    /// Dimensionality of the point.
    pub fn dim(&self) -> usize {
        self.vector.dim()
    }
}

/// When a recomputed centroid counts as unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Positions must be bit-identical.
    #[default]
    Exact,
    /// Euclidean distance between positions must not exceed this value.
    Epsilon(f32),
}

impl Tolerance {
    /// Build a tolerance from a distance threshold. `0.0` means [`Tolerance::Exact`].
    pub fn new(epsilon: f32) -> Result<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::InvalidTolerance(epsilon));
        }
        if epsilon == 0.0 {
            Ok(Self::Exact)
        } else {
            Ok(Self::Epsilon(epsilon))
        }
    }

    /// Check whether `current` is within tolerance of `previous`.
    pub fn within(&self, current: &Vector, previous: &Vector) -> Result<bool> {
        match *self {
            Self::Exact => {
                if current.dim() != previous.dim() {
                    return Err(Error::DimensionMismatch {
                        expected: previous.dim(),
                        found: current.dim(),
                    });
                }
                Ok(current.bit_eq(previous))
            }
            Self::Epsilon(epsilon) => Ok(current.distance(previous)? <= epsilon),
        }
    }
}

/// Representative position of one cluster.
///
/// Equality, ordering and hashing only look at the identity, so a centroid
/// can be used as the group key of its points whatever its position is.
#[derive(Debug, Clone)]
pub struct Centroid {
    id: ClusterId,
    position: Vector,
}

impl Centroid {
    /// Create a centroid.
    pub fn new(id: ClusterId, position: Vector) -> Self {
        Self { id, position }
    }

    /// Identity of the cluster.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Current position.
    pub fn position(&self) -> &Vector {
        &self.position
    }

    /// Dimensionality of the position.
    pub fn dim(&self) -> usize {
        self.position.dim()
    }

    /// Move the cluster of `previous` to `position`.
    ///
    /// Returns the new centroid, which keeps the identity of `previous`, and
    /// whether the move stays within `tolerance` (the convergence vote).
    pub fn update(
        position: Vector,
        previous: &Centroid,
        tolerance: Tolerance,
    ) -> Result<(Centroid, bool)> {
        let converged = tolerance.within(&position, previous.position())?;
        Ok((Centroid::new(previous.id, position), converged))
    }
}

impl PartialEq for Centroid {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Centroid {}

impl Hash for Centroid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Centroid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::{Centroid, DataPoint, Tolerance};
    use crate::error::Error;
    use crate::vector::Vector;

    #[test]
    fn test_update_transfers_identity() {
        let previous = Centroid::new(1, Vector::from([1.0, 1.0]));
        let (next, converged) =
            Centroid::update(Vector::from([2.0, 0.0]), &previous, Tolerance::Exact).unwrap();
        assert!(!converged);
        assert_eq!(next.id(), 1);
        assert_eq!(next.position().as_slice(), &[2.0, 0.0]);
        // the previous value is untouched
        assert_eq!(previous.position().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_update_exact() {
        let previous = Centroid::new(2, Vector::from([5.0, 5.0]));
        let (next, converged) =
            Centroid::update(Vector::from([5.0, 5.0]), &previous, Tolerance::Exact).unwrap();
        assert!(converged);
        assert_eq!(next.id(), 2);

        let nudged = Vector::from([5.0, f32::from_bits(5.0f32.to_bits() + 1)]);
        let (_, converged) = Centroid::update(nudged, &previous, Tolerance::Exact).unwrap();
        assert!(!converged);
    }

    #[test]
    fn test_update_epsilon() {
        let previous = Centroid::new(3, Vector::from([0.0, 0.0]));
        let tolerance = Tolerance::new(0.5).unwrap();
        let (_, converged) =
            Centroid::update(Vector::from([0.3, 0.4]), &previous, tolerance).unwrap();
        assert!(converged);
        let (next, converged) =
            Centroid::update(Vector::from([0.6, 0.8]), &previous, tolerance).unwrap();
        assert!(!converged);
        assert_eq!(next.id(), 3);
    }

    #[test]
    fn test_update_dimension_mismatch() {
        let previous = Centroid::new(0, Vector::from([0.0, 0.0]));
        for tolerance in [Tolerance::Exact, Tolerance::Epsilon(1.0)] {
            assert!(matches!(
                Centroid::update(Vector::from([0.0]), &previous, tolerance),
                Err(Error::DimensionMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_tolerance_new() {
        assert_eq!(Tolerance::new(0.0).unwrap(), Tolerance::Exact);
        assert_eq!(Tolerance::new(1e-3).unwrap(), Tolerance::Epsilon(1e-3));
        assert!(Tolerance::new(-1.0).is_err());
        assert!(Tolerance::new(f32::NAN).is_err());
        assert!(Tolerance::new(f32::INFINITY).is_err());
    }

    #[test]
    fn test_centroid_key_ignores_position() {
        let a = Centroid::new(7, Vector::from([0.0]));
        let b = Centroid::new(7, Vector::from([9.0]));
        assert_eq!(a, b);
        let keys: HashSet<Centroid> = [a, b, Centroid::new(8, Vector::from([0.0]))]
            .into_iter()
            .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_data_point() {
        let p = DataPoint::with_label(Vector::from([1.0, 2.0]), 42);
        assert_eq!(p.label(), Some(42));
        assert_eq!(p.dim(), 2);
        assert_eq!(DataPoint::new(Vector::zeros(3)).label(), None);
    }
}
