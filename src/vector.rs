//! Fixed-length numeric vectors.

use crate::error::{Error, Result};
use crate::simd::{add_assign, l2_squared_distance};

/// An ordered, fixed-length tuple of `f32`.
///
/// Arithmetic never mutates its operands and returns a new vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector(Vec<f32>);

impl Vector {
    /// Create a vector from its components.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// A vector of `dim` zeros.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consume the vector and return its components.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// An independent vector with identical contents.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    fn check_dim(&self, other: &Self) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                found: other.dim(),
            });
        }
        Ok(())
    }

    /// Elementwise sum.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let mut sum = self.copy();
        sum.add_assign_checked(other)?;
        Ok(sum)
    }

    /// Elementwise sum into `self`.
    ///
    /// Only meant for accumulators owned by the caller; shared values go
    /// through [`Vector::add`].
    pub fn add_assign_checked(&mut self, other: &Self) -> Result<()> {
        self.check_dim(other)?;
        add_assign(&mut self.0, &other.0);
        Ok(())
    }

    /// Elementwise quotient.
    pub fn divide(&self, scalar: f32) -> Result<Self> {
        if scalar == 0.0 {
            return Err(Error::DivideByZero);
        }
        Ok(Self(self.0.iter().map(|&v| v / scalar).collect()))
    }

    /// Squared Euclidean distance.
    pub fn squared_distance(&self, other: &Self) -> Result<f32> {
        self.check_dim(other)?;
        Ok(l2_squared_distance(&self.0, &other.0))
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Self) -> Result<f32> {
        Ok(self.squared_distance(other)?.sqrt())
    }

    /// True if both vectors hold exactly the same bits.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.dim() == other.dim()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(l, r)| l.to_bits() == r.to_bits())
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[f32; N]> for Vector {
    fn from(values: [f32; N]) -> Self {
        Self(values.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::Vector;
    use crate::error::Error;

    #[test]
    fn test_add() {
        let x = Vector::from([1.0, 2.0, 3.0]);
        let y = Vector::from([0.5, -2.0, 4.0]);
        let sum = x.add(&y).unwrap();
        assert_eq!(sum.as_slice(), &[1.5, 0.0, 7.0]);
        // operands untouched
        assert_eq!(x.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_add_dimension_mismatch() {
        let x = Vector::from([1.0, 2.0]);
        let y = Vector::from([1.0, 2.0, 3.0]);
        assert!(matches!(
            x.add(&y),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
        let mut acc = Vector::zeros(3);
        assert!(acc.add_assign_checked(&x).is_err());
        assert_eq!(acc, Vector::zeros(3));
    }

    #[test]
    fn test_divide() {
        let x = Vector::from([6.0, 0.0, -3.0]);
        assert_eq!(x.divide(3.0).unwrap().as_slice(), &[2.0, 0.0, -1.0]);
        assert!(matches!(x.divide(0.0), Err(Error::DivideByZero)));
        assert!(matches!(x.divide(-0.0), Err(Error::DivideByZero)));
    }

    #[test]
    fn test_copy_is_independent() {
        let x = Vector::from([1.0, 2.0]);
        let mut y = x.copy();
        y.add_assign_checked(&Vector::from([1.0, 1.0])).unwrap();
        assert_eq!(x.as_slice(), &[1.0, 2.0]);
        assert_eq!(y.as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn test_distance() {
        let x = Vector::from([0.0, 0.0]);
        let y = Vector::from([3.0, 4.0]);
        assert_eq!(x.squared_distance(&y).unwrap(), 25.0);
        assert_eq!(x.distance(&y).unwrap(), 5.0);
        assert!(x.distance(&Vector::zeros(3)).is_err());
    }

    #[test]
    fn test_bit_eq() {
        let x = Vector::from([0.0, 1.0]);
        assert!(x.bit_eq(&Vector::from([0.0, 1.0])));
        assert!(!x.bit_eq(&Vector::from([-0.0, 1.0])));
        assert!(!x.bit_eq(&Vector::from([0.0, 1.0, 2.0])));
    }
}
