//! Linear-algebra adapter
//!
//! Every dense factorisation the network engine needs goes through this
//! module, which delegates to `scirs2_linalg`:
//!
//! - [`qr`] / [`rq`] - thin QR and RQ decompositions (tall and wide inputs)
//! - [`truncated_svd`] - rank-revealing split `M ≈ left · right` under an
//!   error budget, computed by SVD or through the Gram matrix
//! - [`least_squares`] - column-wise least-squares solve used by CP-ALS
//! - [`dominant_eigenvectors`] - leading eigenvectors of a symmetric PSD matrix
//!
//! # Truncation rule
//!
//! Given singular values `s_0 ≥ s_1 ≥ …` and an absolute budget `δ`, the
//! kept rank starts at the smallest `r` such that `Σ_{i≥r} s_i² ≤ δ²`, clamped
//! to `[1, rmax]`, and is raised while the measured residual `‖M − left·right‖`
//! still exceeds `δ`.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayView2};
use scirs2_linalg::{lstsq, qr as qr_decompose, svd};

/// How [`truncated_svd`] obtains singular values and vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationAlgorithm {
    /// Singular value decomposition of the matrix itself
    #[default]
    Svd,
    /// Symmetric decomposition of the Gram matrix (`M Mᵀ` or `Mᵀ M`).
    ///
    /// Cheaper for very unbalanced matrices, but squares the condition number.
    Eig,
}

/// Error budget of a truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SvdBudget {
    /// Discarded singular values must satisfy `Σ s_i² ≤ δ²`
    Absolute(f64),
    /// Budget relative to the matrix Frobenius norm: `δ = ε‖M‖_F`
    Relative(f64),
}

/// Frobenius norm of a matrix.
pub fn frobenius(matrix: &ArrayView2<f64>) -> f64 {
    matrix.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn ensure_non_empty(operation: &str, matrix: &ArrayView2<f64>) -> KernelResult<()> {
    if matrix.nrows() == 0 || matrix.ncols() == 0 {
        return Err(KernelError::empty_input(operation, "matrix"));
    }
    Ok(())
}

/// Thin QR decomposition `M = Q R`.
///
/// For an `m × n` matrix with `k = min(m, n)`, `Q` is `m × k` with orthonormal
/// columns and `R` is `k × n`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tnet_kernels::linalg::qr;
///
/// let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let (q, r) = qr(&m.view()).unwrap();
/// assert_eq!(q.dim(), (2, 2));
/// assert_eq!(r.dim(), (2, 3));
/// ```
pub fn qr(matrix: &ArrayView2<f64>) -> KernelResult<(Array2<f64>, Array2<f64>)> {
    ensure_non_empty("qr", matrix)?;
    let (m, n) = matrix.dim();

    if m >= n {
        let (q_full, r_full) =
            qr_decompose(matrix, None).map_err(|e| KernelError::linalg("qr", e))?;
        let q = q_full.slice(s![.., ..n]).to_owned();
        let r = r_full.slice(s![..n, ..]).to_owned();
        Ok((q, r))
    } else {
        // Wide: the leading m columns span the whole column space.
        let head = matrix.slice(s![.., ..m]);
        let (q_full, _) = qr_decompose(&head, None).map_err(|e| KernelError::linalg("qr", e))?;
        let q = q_full.slice(s![.., ..m]).to_owned();
        let r = q.t().dot(matrix);
        Ok((q, r))
    }
}

/// Thin RQ decomposition `M = L Q` with `Q` having orthonormal rows.
///
/// Computed from the QR decomposition of `Mᵀ`.
pub fn rq(matrix: &ArrayView2<f64>) -> KernelResult<(Array2<f64>, Array2<f64>)> {
    let transposed = matrix.t();
    let (q, r) = qr(&transposed)?;
    Ok((r.t().to_owned(), q.t().to_owned()))
}

/// Thin SVD `M = U diag(s) Vᵀ` with `k = min(m, n)` singular triplets.
pub fn thin_svd(
    matrix: &ArrayView2<f64>,
) -> KernelResult<(Array2<f64>, Array1<f64>, Array2<f64>)> {
    ensure_non_empty("svd", matrix)?;
    let (u, sigma, vt) = svd(matrix, false, None).map_err(|e| KernelError::linalg("svd", e))?;
    let k = sigma.len().min(u.ncols()).min(vt.nrows());
    Ok((
        u.slice(s![.., ..k]).to_owned(),
        sigma.slice(s![..k]).to_owned(),
        vt.slice(s![..k, ..]).to_owned(),
    ))
}

/// Number of singular values to keep under an absolute budget `delta`.
///
/// ```
/// use tnet_kernels::linalg::truncation_rank;
///
/// let s = [4.0, 2.0, 0.5, 0.1];
/// assert_eq!(truncation_rank(&s, 0.0, None), 4);
/// assert_eq!(truncation_rank(&s, 0.6, None), 2);
/// assert_eq!(truncation_rank(&s, 0.6, Some(1)), 1);
/// assert_eq!(truncation_rank(&s, 100.0, None), 1);
/// ```
pub fn truncation_rank(singular_values: &[f64], delta: f64, rmax: Option<usize>) -> usize {
    let n = singular_values.len();
    let threshold = delta * delta;
    let mut tail = vec![0.0; n + 1];
    for i in (0..n).rev() {
        tail[i] = tail[i + 1] + singular_values[i] * singular_values[i];
    }
    let rank = (0..n).find(|&i| tail[i] <= threshold).unwrap_or(n);
    rank.min(rmax.unwrap_or(usize::MAX)).max(1)
}

/// Split `M ≈ left · right` keeping as few singular directions as the budget allows.
///
/// With `left_ortho` the left factor has orthonormal columns and the singular
/// values go to the right factor; otherwise the right factor has orthonormal
/// rows and the left factor carries the singular values.
///
/// The singular vectors only select the kept subspace: they are
/// re-orthonormalised and `M` is projected onto them, so the reconstruction
/// error is the measured projection residual. The rank grows until that
/// residual fits the budget (or reaches `rmax`); a full-rank split falls back
/// to an exact QR / RQ.
///
/// # Errors
///
/// Returns an error for empty matrices or when the decomposition fails.
pub fn truncated_svd(
    matrix: &ArrayView2<f64>,
    budget: SvdBudget,
    rmax: Option<usize>,
    left_ortho: bool,
    algorithm: TruncationAlgorithm,
) -> KernelResult<(Array2<f64>, Array2<f64>)> {
    ensure_non_empty("truncated_svd", matrix)?;
    let delta = match budget {
        SvdBudget::Absolute(delta) => delta,
        SvdBudget::Relative(eps) => eps * frobenius(matrix),
    };
    let full = matrix.nrows().min(matrix.ncols());
    let cap = rmax.unwrap_or(usize::MAX).max(1);

    // Candidate basis vectors as columns: of the column space when
    // `left_ortho`, of the row space otherwise.
    let (candidates, sigma) = match algorithm {
        TruncationAlgorithm::Svd => {
            let (u, sigma, vt) = thin_svd(matrix)?;
            let basis = if left_ortho { u } else { vt.t().to_owned() };
            (basis, sigma.to_vec())
        }
        TruncationAlgorithm::Eig => {
            let gram = if left_ortho {
                matrix.dot(&matrix.t())
            } else {
                matrix.t().dot(matrix)
            };
            let (vectors, eigenvalues, _) = thin_svd(&gram.view())?;
            let sigma = eigenvalues.iter().map(|l| l.max(0.0).sqrt()).collect();
            (vectors, sigma)
        }
    };

    let mut rank = truncation_rank(&sigma, delta, rmax);
    loop {
        if rank >= full {
            return if left_ortho { qr(matrix) } else { rq(matrix) };
        }
        let kept = rank.min(candidates.ncols());
        let (q, _) = qr(&candidates.slice(s![.., ..kept]))?;
        let (left, right) = if left_ortho {
            let right = q.t().dot(matrix);
            (q, right)
        } else {
            let left = matrix.dot(&q);
            (left, q.t().to_owned())
        };
        let residual = matrix.to_owned() - left.dot(&right);
        if frobenius(&residual.view()) <= delta || rank >= cap {
            return Ok((left, right));
        }
        rank += 1;
    }
}

/// Solve `A X = B` in the least-squares sense, one column of `B` at a time.
///
/// A failed solve is retried once with a small diagonal regularisation.
///
/// # Errors
///
/// Returns an error if the row counts differ or the solver fails twice.
pub fn least_squares(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> KernelResult<Array2<f64>> {
    if a.nrows() != b.nrows() {
        return Err(KernelError::dimension_mismatch(
            "least_squares",
            vec![a.nrows()],
            vec![b.nrows()],
            "A and B must have the same number of rows",
        ));
    }
    let (rows, cols) = a.dim();
    let mut x = Array2::<f64>::zeros((cols, b.ncols()));

    for (j, rhs) in b.columns().into_iter().enumerate() {
        let rhs = rhs.to_owned();
        let solution = match lstsq(a, &rhs.view(), None) {
            Ok(solution) => solution,
            Err(_) => {
                let reg = f64::EPSILON * (cols * 10) as f64;
                let mut a_reg = a.to_owned();
                for k in 0..rows.min(cols) {
                    a_reg[[k, k]] += reg;
                }
                lstsq(&a_reg.view(), &rhs.view(), None)
                    .map_err(|e| KernelError::linalg("least_squares", e))?
            }
        };
        x.column_mut(j).assign(&solution.x);
    }

    Ok(x)
}

/// The `k` leading eigenvectors (as columns) of a symmetric positive
/// semi-definite matrix, at most `n` of them for an `n × n` input.
pub fn dominant_eigenvectors(gram: &ArrayView2<f64>, k: usize) -> KernelResult<Array2<f64>> {
    if gram.nrows() != gram.ncols() {
        return Err(KernelError::dimension_mismatch(
            "dominant_eigenvectors",
            vec![gram.nrows(), gram.nrows()],
            gram.shape().to_vec(),
            "Gram matrix must be square",
        ));
    }
    let (u, _, _) = thin_svd(gram)?;
    let k = k.min(u.ncols());
    Ok(u.slice(s![.., ..k]).to_owned())
}
