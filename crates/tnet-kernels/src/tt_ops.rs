//! Contraction kernels on single cores.
//!
//! A TT core `G` has shape `(r_left, n, r_right)`. The kernels here reshape,
//! orthogonalise and contract such cores; they know nothing about whole
//! networks.
//!
//! # Unfoldings
//!
//! - left unfolding: `(r_left · n, r_right)`
//! - right unfolding: `(r_left, n · r_right)`
//!
//! # Examples
//!
//! ```rust
//! use scirs2_core::ndarray_ext::Array3;
//! use tnet_kernels::tt_ops::{left_unfolding, tt_left_orthogonalize_core};
//!
//! let core = Array3::<f64>::ones((2, 3, 4));
//! assert_eq!(left_unfolding(&core).dim(), (6, 4));
//!
//! let (q, r) = tt_left_orthogonalize_core(&core).unwrap();
//! assert_eq!(q.shape()[2], r.nrows());
//! ```

use crate::error::{KernelError, KernelResult};
use crate::linalg::{qr, rq};
use scirs2_core::ndarray_ext::{s, Array2, Array3, Axis};

fn reshape_core(data: Vec<f64>, shape: (usize, usize, usize)) -> KernelResult<Array3<f64>> {
    Array3::from_shape_vec(shape, data)
        .map_err(|e| KernelError::operation_error("reshape_core", e.to_string()))
}

/// Left unfolding `(r_left · n, r_right)` of a TT core.
pub fn left_unfolding(core: &Array3<f64>) -> Array2<f64> {
    let (r_left, n, r_right) = core.dim();
    Array2::from_shape_fn((r_left * n, r_right), |(row, k)| core[[row / n, row % n, k]])
}

/// Right unfolding `(r_left, n · r_right)` of a TT core.
pub fn right_unfolding(core: &Array3<f64>) -> Array2<f64> {
    let (r_left, n, r_right) = core.dim();
    Array2::from_shape_fn((r_left, n * r_right), |(i, col)| {
        core[[i, col / r_right, col % r_right]]
    })
}

/// Fold a `(r_left · n, r_right)` matrix back into a core.
pub fn fold_left(matrix: &Array2<f64>, r_left: usize, n: usize) -> KernelResult<Array3<f64>> {
    if matrix.nrows() != r_left * n {
        return Err(KernelError::dimension_mismatch(
            "fold_left",
            vec![r_left * n],
            vec![matrix.nrows()],
            "row count must equal r_left * n",
        ));
    }
    reshape_core(matrix.iter().cloned().collect(), (r_left, n, matrix.ncols()))
}

/// Fold a `(r_left, n · r_right)` matrix back into a core.
pub fn fold_right(matrix: &Array2<f64>, n: usize, r_right: usize) -> KernelResult<Array3<f64>> {
    if matrix.ncols() != n * r_right {
        return Err(KernelError::dimension_mismatch(
            "fold_right",
            vec![n * r_right],
            vec![matrix.ncols()],
            "column count must equal n * r_right",
        ));
    }
    reshape_core(matrix.iter().cloned().collect(), (matrix.nrows(), n, r_right))
}

/// Swap the last two axes: `(a, b, c) -> (a, c, b)`.
pub fn swap_trailing_axes(core: &Array3<f64>) -> Array3<f64> {
    core.view().permuted_axes([0, 2, 1]).as_standard_layout().to_owned()
}

/// Promote a CP factor matrix `(n, R)` to its diagonal TT core `(R, n, R)`.
pub fn cp_to_tt(cp: &Array2<f64>) -> Array3<f64> {
    let (n, rank) = cp.dim();
    let mut core = Array3::<f64>::zeros((rank, n, rank));
    for i in 0..n {
        for r in 0..rank {
            core[[r, i, r]] = cp[[i, r]];
        }
    }
    core
}

/// Mode product on the middle index: `out[i, a, k] = Σ_j core[i, j, k] · u[a, j]`.
pub fn mode_product(core: &Array3<f64>, u: &Array2<f64>) -> KernelResult<Array3<f64>> {
    let (r_left, n, r_right) = core.dim();
    if u.ncols() != n {
        return Err(KernelError::dimension_mismatch(
            "mode_product",
            vec![n],
            vec![u.ncols()],
            "factor columns must match the core middle size",
        ));
    }
    let mut out = Array3::<f64>::zeros((r_left, u.nrows(), r_right));
    for i in 0..r_left {
        let slab = core.index_axis(Axis(0), i);
        out.slice_mut(s![i, .., ..]).assign(&u.dot(&slab));
    }
    Ok(out)
}

/// Contract the right bond with a matrix: `out[i, j, l] = Σ_k core[i, j, k] · m[k, l]`.
pub fn absorb_right(core: &Array3<f64>, matrix: &Array2<f64>) -> KernelResult<Array3<f64>> {
    let (r_left, n, r_right) = core.dim();
    if matrix.nrows() != r_right {
        return Err(KernelError::dimension_mismatch(
            "absorb_right",
            vec![r_right],
            vec![matrix.nrows()],
            "matrix rows must match the core right rank",
        ));
    }
    let product = left_unfolding(core).dot(matrix);
    fold_left(&product, r_left, n)
}

/// Contract the left bond with a matrix: `out[i, j, k] = Σ_a m[i, a] · core[a, j, k]`.
pub fn absorb_left(matrix: &Array2<f64>, core: &Array3<f64>) -> KernelResult<Array3<f64>> {
    let (r_left, n, r_right) = core.dim();
    if matrix.ncols() != r_left {
        return Err(KernelError::dimension_mismatch(
            "absorb_left",
            vec![r_left],
            vec![matrix.ncols()],
            "matrix columns must match the core left rank",
        ));
    }
    let product = matrix.dot(&right_unfolding(core));
    fold_right(&product, n, r_right)
}

/// Left-orthogonalize a single TT core.
///
/// Returns `(Q, R)` where `Q` is a core `(r_left, n, k)` whose left unfolding
/// has orthonormal columns and `R` is `(k, r_right)`, with
/// `left_unfolding(core) = left_unfolding(Q) · R`.
pub fn tt_left_orthogonalize_core(core: &Array3<f64>) -> KernelResult<(Array3<f64>, Array2<f64>)> {
    let (r_left, n, _) = core.dim();
    let (q, r) = qr(&left_unfolding(core).view())?;
    Ok((fold_left(&q, r_left, n)?, r))
}

/// Right-orthogonalize a single TT core.
///
/// Returns `(L, Q)` where `L` is `(r_left, k)` and `Q` is a core `(k, n, r_right)`
/// whose right unfolding has orthonormal rows.
pub fn tt_right_orthogonalize_core(
    core: &Array3<f64>,
) -> KernelResult<(Array2<f64>, Array3<f64>)> {
    let (_, n, r_right) = core.dim();
    let (l, q) = rq(&right_unfolding(core).view())?;
    Ok((l, fold_right(&q, n, r_right)?))
}

/// Inner product of two chains of TT cores.
///
/// Boundary ranks may exceed one; they are summed (all-ones boundary vectors).
pub fn tt_dot(cores_x: &[Array3<f64>], cores_y: &[Array3<f64>]) -> KernelResult<f64> {
    if cores_x.is_empty() {
        return Err(KernelError::empty_input("tt_dot", "cores_x"));
    }
    if cores_x.len() != cores_y.len() {
        return Err(KernelError::dimension_mismatch(
            "tt_dot",
            vec![cores_x.len()],
            vec![cores_y.len()],
            "Both chains must have the same number of cores",
        ));
    }

    let mut env = Array2::<f64>::ones((cores_x[0].shape()[0], cores_y[0].shape()[0]));
    for (k, (gx, gy)) in cores_x.iter().zip(cores_y.iter()).enumerate() {
        let (_, n, rx) = gx.dim();
        if gy.shape()[1] != n {
            return Err(KernelError::dimension_mismatch(
                "tt_dot",
                vec![n],
                vec![gy.shape()[1]],
                format!("Mode sizes differ at core {}", k),
            ));
        }
        let mut next = Array2::<f64>::zeros((rx, gy.shape()[2]));
        for j in 0..n {
            let sx = gx.index_axis(Axis(1), j);
            let sy = gy.index_axis(Axis(1), j);
            next += &sx.t().dot(&env).dot(&sy);
        }
        env = next;
    }
    Ok(env.sum())
}
