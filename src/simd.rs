//! Accelerate vector arithmetic with SIMD.
//!
//! Kernels are written against [`pulp::Simd`] and dispatched at runtime with
//! [`pulp::Arch`]. The `*_native` variants are the scalar references.

use core::iter;

use pulp::{Arch, Simd, WithSimd, as_arrays};

#[inline(always)]
fn abs2_add<S: Simd>(simd: S, x: S::f32s, acc: S::f32s) -> S::f32s {
    simd.mul_add_f32s(x, x, acc)
}

/// Compute the squared Euclidean distance between two vectors.
///
/// Code refers to <https://github.com/nmslib/hnswlib/blob/master/hnswlib/space_l2.h>
#[inline]
pub fn l2_squared_distance_simd<S: Simd>(simd: S, lhs: &[f32], rhs: &[f32]) -> f32 {
    simd.vectorize(
        #[inline(always)]
        || {
            assert_eq!(lhs.len(), rhs.len());

            let (lhs, lhs_tail) = S::as_simd_f32s(lhs);
            let (rhs, rhs_tail) = S::as_simd_f32s(rhs);

            let (lhs2, lhs1) = as_arrays::<2, _>(lhs);
            let (rhs2, rhs1) = as_arrays::<2, _>(rhs);

            let mut sum0 = simd.splat_f32s(0.0);
            let mut sum1 = simd.splat_f32s(0.0);

            for (&[l0, l1], &[r0, r1]) in iter::zip(lhs2, rhs2) {
                sum0 = abs2_add(simd, simd.sub_f32s(l0, r0), sum0);
                sum1 = abs2_add(simd, simd.sub_f32s(l1, r1), sum1);
            }

            for (&l0, &r0) in iter::zip(lhs1, rhs1) {
                sum0 = abs2_add(simd, simd.sub_f32s(l0, r0), sum0);
            }
            {
                let l0 = simd.partial_load_f32s(lhs_tail);
                let r0 = simd.partial_load_f32s(rhs_tail);

                sum0 = abs2_add(simd, simd.sub_f32s(l0, r0), sum0);
            }

            simd.reduce_sum_f32s(simd.add_f32s(sum0, sum1))
        },
    )
}

/// Add `rhs` into `acc` elementwise.
///
/// Lane-wise addition rounds exactly like the scalar loop, so the result is
/// bitwise identical to [`add_assign_native`].
#[inline]
pub fn add_assign_simd<S: Simd>(simd: S, acc: &mut [f32], rhs: &[f32]) {
    simd.vectorize(
        #[inline(always)]
        || {
            assert_eq!(acc.len(), rhs.len());

            let (acc, acc_tail) = S::as_mut_simd_f32s(acc);
            let (rhs, rhs_tail) = S::as_simd_f32s(rhs);

            for (a, &r) in iter::zip(acc, rhs) {
                *a = simd.add_f32s(*a, r);
            }
            {
                let a = simd.partial_load_f32s(&*acc_tail);
                let r = simd.partial_load_f32s(rhs_tail);
                simd.partial_store_f32s(acc_tail, simd.add_f32s(a, r));
            }
        },
    )
}

/// Scalar squared Euclidean distance.
pub fn l2_squared_distance_native(lhs: &[f32], rhs: &[f32]) -> f32 {
    lhs.iter()
        .zip(rhs.iter())
        .map(|(&l, &r)| (l - r) * (l - r))
        .sum()
}

/// Scalar elementwise add.
pub fn add_assign_native(acc: &mut [f32], rhs: &[f32]) {
    acc.iter_mut().zip(rhs.iter()).for_each(|(a, &r)| *a += r);
}

struct L2Squared<'a> {
    lhs: &'a [f32],
    rhs: &'a [f32],
}

impl WithSimd for L2Squared<'_> {
    type Output = f32;

    #[inline(always)]
    fn with_simd<S: Simd>(self, simd: S) -> f32 {
        l2_squared_distance_simd(simd, self.lhs, self.rhs)
    }
}

struct AddAssign<'a> {
    acc: &'a mut [f32],
    rhs: &'a [f32],
}

impl WithSimd for AddAssign<'_> {
    type Output = ();

    #[inline(always)]
    fn with_simd<S: Simd>(self, simd: S) {
        add_assign_simd(simd, self.acc, self.rhs)
    }
}

/// Squared Euclidean distance with the best SIMD level of this CPU.
///
/// Panics if the lengths differ; callers check dimensions first.
#[inline]
pub fn l2_squared_distance(lhs: &[f32], rhs: &[f32]) -> f32 {
    Arch::new().dispatch(L2Squared { lhs, rhs })
}

/// Elementwise add with the best SIMD level of this CPU.
///
/// Panics if the lengths differ; callers check dimensions first.
#[inline]
pub fn add_assign(acc: &mut [f32], rhs: &[f32]) {
    Arch::new().dispatch(AddAssign { acc, rhs })
}
