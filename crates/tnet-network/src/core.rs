//! Per-axis cores: TT or CP
//!
//! A network stores one [`Core`] per axis. A TT core carries its own bond
//! ranks; a CP core is a matrix whose columns share one global rank and
//! behaves like the diagonal TT core `(R, n, R)` (see [`Core::to_tt`]).
//! Algorithms that need bond structure promote CP cores on the fly; the
//! stored variant decides the format, never the array dimensionality.

use scirs2_core::ndarray_ext::{Array1, Array2, Array3, Axis};
use tnet_kernels::tt_ops::{cp_to_tt, mode_product};
use tnet_kernels::KernelResult;

/// One axis of a tensor network.
#[derive(Debug, Clone, PartialEq)]
pub enum Core {
    /// Tensor-train core of shape `(r_left, n, r_right)`
    Tt(Array3<f64>),
    /// CP factor matrix of shape `(n, R)`
    Cp(Array2<f64>),
}

impl Core {
    pub fn is_tt(&self) -> bool {
        matches!(self, Core::Tt(_))
    }

    pub fn is_cp(&self) -> bool {
        matches!(self, Core::Cp(_))
    }

    /// Size of the middle (physical or Tucker) index.
    pub fn middle_size(&self) -> usize {
        match self {
            Core::Tt(g) => g.shape()[1],
            Core::Cp(a) => a.nrows(),
        }
    }

    /// Rank of the bond to the previous axis.
    pub fn left_rank(&self) -> usize {
        match self {
            Core::Tt(g) => g.shape()[0],
            Core::Cp(a) => a.ncols(),
        }
    }

    /// Rank of the bond to the next axis.
    pub fn right_rank(&self) -> usize {
        match self {
            Core::Tt(g) => g.shape()[2],
            Core::Cp(a) => a.ncols(),
        }
    }

    /// Number of stored coefficients.
    pub fn len(&self) -> usize {
        match self {
            Core::Tt(g) => g.len(),
            Core::Cp(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_tt(&self) -> Option<&Array3<f64>> {
        match self {
            Core::Tt(g) => Some(g),
            Core::Cp(_) => None,
        }
    }

    pub fn as_cp(&self) -> Option<&Array2<f64>> {
        match self {
            Core::Cp(a) => Some(a),
            Core::Tt(_) => None,
        }
    }

    /// Promote to a TT core. CP cores become diagonal `(R, n, R)` cores.
    pub fn to_tt(&self) -> Array3<f64> {
        match self {
            Core::Tt(g) => g.clone(),
            Core::Cp(a) => cp_to_tt(a),
        }
    }

    /// Consuming variant of [`Core::to_tt`].
    pub fn into_tt(self) -> Array3<f64> {
        match self {
            Core::Tt(g) => g,
            Core::Cp(a) => cp_to_tt(&a),
        }
    }

    /// Contract a matrix `(m, n)` into the middle index, giving middle size `m`.
    pub fn mode_product(&self, u: &Array2<f64>) -> KernelResult<Core> {
        match self {
            Core::Tt(g) => Ok(Core::Tt(mode_product(g, u)?)),
            Core::Cp(a) => {
                if u.ncols() != a.nrows() {
                    return Err(tnet_kernels::KernelError::dimension_mismatch(
                        "mode_product",
                        vec![a.nrows()],
                        vec![u.ncols()],
                        "factor columns must match the CP row count",
                    ));
                }
                Ok(Core::Cp(u.dot(a)))
            }
        }
    }

    /// Keep only the given middle positions, in order (repetitions allowed).
    pub fn select_middle(&self, positions: &[usize]) -> Core {
        match self {
            Core::Tt(g) => Core::Tt(g.select(Axis(1), positions)),
            Core::Cp(a) => Core::Cp(a.select(Axis(0), positions)),
        }
    }

    /// Repeat the middle index `reps` times (tiling, not interleaving).
    pub fn tile_middle(&self, reps: usize) -> Core {
        match self {
            Core::Tt(g) => {
                let (ra, n, rb) = g.dim();
                Core::Tt(Array3::from_shape_fn((ra, n * reps, rb), |(a, j, b)| {
                    g[[a, j % n, b]]
                }))
            }
            Core::Cp(a) => {
                let (n, r) = a.dim();
                Core::Cp(Array2::from_shape_fn((n * reps, r), |(j, k)| a[[j % n, k]]))
            }
        }
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&mut self, factor: f64) {
        match self {
            Core::Tt(g) => g.mapv_inplace(|x| x * factor),
            Core::Cp(a) => a.mapv_inplace(|x| x * factor),
        }
    }

    /// Sum over the middle index weighted by `weights` (length `n`).
    ///
    /// TT cores give a `(r_left, r_right)` matrix; CP cores give the diagonal
    /// of the equivalent matrix as a vector of length `R`.
    pub(crate) fn weighted_middle_sum(&self, weights: &Array1<f64>) -> MiddleSum {
        match self {
            Core::Tt(g) => {
                let (ra, n, rb) = g.dim();
                let mut acc = Array2::<f64>::zeros((ra, rb));
                for j in 0..n {
                    acc.scaled_add(weights[j], &g.index_axis(Axis(1), j));
                }
                MiddleSum::Matrix(acc)
            }
            Core::Cp(a) => MiddleSum::Diagonal(a.t().dot(weights)),
        }
    }
}

/// Result of contracting a core's middle index with a vector.
#[derive(Debug, Clone)]
pub(crate) enum MiddleSum {
    Matrix(Array2<f64>),
    Diagonal(Array1<f64>),
}

impl MiddleSum {
    /// Row vector times this matrix.
    pub(crate) fn apply_left(&self, v: &Array1<f64>) -> Array1<f64> {
        match self {
            MiddleSum::Matrix(m) => v.dot(m),
            MiddleSum::Diagonal(d) => v * d,
        }
    }

    /// This matrix times a column vector.
    pub(crate) fn apply_right(&self, v: &Array1<f64>) -> Array1<f64> {
        match self {
            MiddleSum::Matrix(m) => m.dot(v),
            MiddleSum::Diagonal(d) => d * v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_cp_ranks_and_promotion() {
        let cp = Core::Cp(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert!(cp.is_cp());
        assert_eq!(cp.middle_size(), 3);
        assert_eq!(cp.left_rank(), 2);
        assert_eq!(cp.right_rank(), 2);
        let tt = cp.to_tt();
        assert_eq!(tt.dim(), (2, 3, 2));
        assert_eq!(tt[[0, 1, 0]], 3.0);
        assert_eq!(tt[[0, 1, 1]], 0.0);
        assert_eq!(cp.clone().into_tt(), tt);
    }

    #[test]
    fn test_select_and_tile() {
        let tt = Core::Tt(Array3::from_shape_fn((1, 3, 2), |(_, j, k)| (j * 2 + k) as f64));
        let picked = tt.select_middle(&[2, 0]);
        assert_eq!(picked.middle_size(), 2);
        assert_eq!(picked.as_tt().unwrap()[[0, 0, 1]], 5.0);

        let tiled = tt.tile_middle(3);
        assert_eq!(tiled.middle_size(), 9);
        assert_eq!(tiled.as_tt().unwrap()[[0, 7, 0]], 2.0);

        let cp = Core::Cp(array![[1.0], [2.0]]);
        assert_eq!(cp.tile_middle(2).as_cp().unwrap().column(0).to_vec(), vec![1.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_mode_product_cp() {
        let cp = Core::Cp(array![[1.0, 2.0], [3.0, 4.0]]);
        let u = array![[1.0, 1.0]];
        let out = cp.mode_product(&u).unwrap();
        assert_eq!(out.as_cp().unwrap(), &array![[4.0, 6.0]]);
        assert!(cp.mode_product(&array![[1.0, 1.0, 1.0]]).is_err());
    }

    #[test]
    fn test_weighted_middle_sum() {
        let cp = Core::Cp(array![[1.0, 2.0], [3.0, 4.0]]);
        let w = array![1.0, 1.0];
        match cp.weighted_middle_sum(&w) {
            MiddleSum::Diagonal(d) => assert_eq!(d.to_vec(), vec![4.0, 6.0]),
            MiddleSum::Matrix(_) => panic!("CP core must give a diagonal"),
        }
        let tt = Core::Tt(cp.to_tt());
        match tt.weighted_middle_sum(&w) {
            MiddleSum::Matrix(m) => assert_eq!(m, array![[4.0, 0.0], [0.0, 6.0]]),
            MiddleSum::Diagonal(_) => panic!("TT core must give a matrix"),
        }
    }
}
