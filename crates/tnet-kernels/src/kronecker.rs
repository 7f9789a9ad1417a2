//! Kronecker-type products of TT cores
//!
//! The element-wise product of two networks multiplies their cores slice by
//! slice: for every index `j` of the middle mode the two matrices `A[:, j, :]`
//! and `B[:, j, :]` are combined through the matrix Kronecker product.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::Array3;

/// Slice-wise Kronecker product of two cores sharing the middle size.
///
/// For A `(ra, n, rb)` and B `(rc, n, rd)` the result is `(ra·rc, n, rb·rd)` with
/// `C[a*rc + c, j, b*rd + d] = A[a, j, b] · B[c, j, d]`.
///
/// # Errors
///
/// Returns an error if the middle sizes differ.
///
/// ```
/// use scirs2_core::ndarray_ext::Array3;
/// use tnet_kernels::core_kron;
///
/// let a = Array3::<f64>::ones((1, 4, 2));
/// let b = Array3::<f64>::from_elem((3, 4, 1), 2.0);
/// let c = core_kron(&a, &b).unwrap();
/// assert_eq!(c.dim(), (3, 4, 2));
/// assert_eq!(c[[2, 3, 1]], 2.0);
/// ```
pub fn core_kron(a: &Array3<f64>, b: &Array3<f64>) -> KernelResult<Array3<f64>> {
    let (ra, n, rb) = a.dim();
    let (rc, n_b, rd) = b.dim();
    if n != n_b {
        return Err(KernelError::dimension_mismatch(
            "core_kron",
            vec![n],
            vec![n_b],
            "cores must share the middle size",
        ));
    }

    Ok(Array3::from_shape_fn((ra * rc, n, rb * rd), |(left, j, right)| {
        a[[left / rc, j, right / rd]] * b[[left % rc, j, right % rd]]
    }))
}

/// Full outer product of two cores over all three indices.
///
/// For A `(ra, p, rb)` and B `(rc, q, rd)` the result is `(ra·rc, p·q, rb·rd)`
/// with every index pair flattened row-major (first operand slowest).
pub fn core_outer(a: &Array3<f64>, b: &Array3<f64>) -> Array3<f64> {
    let (ra, p, rb) = a.dim();
    let (rc, q, rd) = b.dim();

    Array3::from_shape_fn((ra * rc, p * q, rb * rd), |(left, mid, right)| {
        a[[left / rc, mid / q, right / rd]] * b[[left % rc, mid % q, right % rd]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(shape: (usize, usize, usize), seed: f64) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(i, j, k)| seed + i as f64 - 0.5 * j as f64 + 0.25 * k as f64)
    }

    #[test]
    fn test_core_kron_slices() {
        let a = sample((2, 3, 2), 1.0);
        let b = sample((2, 3, 3), -0.5);
        let c = core_kron(&a, &b).unwrap();
        assert_eq!(c.dim(), (4, 3, 6));
        assert_eq!(c[[3, 1, 5]], a[[1, 1, 1]] * b[[1, 1, 2]]);
        assert_eq!(c[[1, 2, 2]], a[[0, 2, 0]] * b[[1, 2, 2]]);
    }

    #[test]
    fn test_core_kron_middle_mismatch() {
        let a = sample((1, 3, 1), 1.0);
        let b = sample((1, 4, 1), 1.0);
        assert!(core_kron(&a, &b).is_err());
    }

    #[test]
    fn test_core_outer() {
        let a = sample((1, 2, 2), 1.0);
        let b = sample((2, 3, 1), 2.0);
        let c = core_outer(&a, &b);
        assert_eq!(c.dim(), (2, 6, 2));
        assert_eq!(c[[1, 5, 1]], a[[0, 1, 1]] * b[[1, 2, 0]]);
    }
}
