//! Building networks from dense data
//!
//! Three strategies:
//!
//! - **Full rank**: reshape the data into an exact TT chain (no compression).
//! - **TT-SVD**: full rank followed by [`TensorNetwork::round`].
//! - **CP-ALS**: alternating least squares for a target CP rank, optionally
//!   on the core of a Tucker truncation.
//!
//! [`TensorNetwork::decompose`] dispatches between them according to
//! [`DecompositionOptions`].

use crate::core::Core;
use crate::error::{NetworkError, Result};
use crate::network::TensorNetwork;
use crate::rounding::{Ranks, RoundingOptions};
use log::{debug, info, warn};
use scirs2_core::ndarray_ext::{s, Array2, Array3};
use tnet_core::DenseND;
use tnet_kernels::khatri_rao::khatri_rao;
use tnet_kernels::linalg::{dominant_eigenvectors, least_squares};
use tnet_kernels::TruncationAlgorithm;

/// Scale of the random columns padding a HOSVD initialisation.
const INIT_PADDING_SCALE: f64 = 0.01;

/// How [`TensorNetwork::decompose`] compresses dense data.
///
/// `eps` and explicit ranks are mutually exclusive, as are CP and TT ranks.
///
/// # Examples
///
/// ```
/// use tnet_network::DecompositionOptions;
///
/// let opts = DecompositionOptions::default().with_ranks_cp(3).with_max_iter(50);
/// assert!(opts.validate().is_ok());
/// assert!(opts.with_eps(1e-6).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionOptions {
    pub ranks_cp: Option<usize>,
    pub ranks_tucker: Option<Ranks>,
    pub ranks_tt: Option<Ranks>,
    /// Relative error budget for TT-SVD
    pub eps: Option<f64>,
    /// CP-ALS sweep limit
    pub max_iter: usize,
    /// CP-ALS stops once the error improves by less than this
    pub tol: f64,
    /// Log CP-ALS progress at `info` instead of `debug`
    pub verbose: bool,
    pub algorithm: TruncationAlgorithm,
}

impl Default for DecompositionOptions {
    fn default() -> Self {
        Self {
            ranks_cp: None,
            ranks_tucker: None,
            ranks_tt: None,
            eps: None,
            max_iter: 25,
            tol: 1e-4,
            verbose: false,
            algorithm: TruncationAlgorithm::Svd,
        }
    }
}

impl DecompositionOptions {
    pub fn with_ranks_cp(mut self, rank: usize) -> Self {
        self.ranks_cp = Some(rank);
        self
    }

    pub fn with_ranks_tucker(mut self, ranks: impl Into<Ranks>) -> Self {
        self.ranks_tucker = Some(ranks.into());
        self
    }

    pub fn with_ranks_tt(mut self, ranks: impl Into<Ranks>) -> Self {
        self.ranks_tt = Some(ranks.into());
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = Some(eps);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_algorithm(mut self, algorithm: TruncationAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Reject contradictory or out-of-range settings.
    pub fn validate(&self) -> Result<()> {
        if self.eps.is_some()
            && (self.ranks_cp.is_some() || self.ranks_tucker.is_some() || self.ranks_tt.is_some())
        {
            return Err(NetworkError::ConflictingOptions(
                "an error budget cannot be combined with explicit ranks".to_string(),
            ));
        }
        if self.ranks_cp.is_some() && self.ranks_tt.is_some() {
            return Err(NetworkError::ConflictingOptions(
                "CP and TT ranks cannot both be given".to_string(),
            ));
        }
        if let Some(eps) = self.eps {
            if eps.is_nan() || eps < 0.0 {
                return Err(NetworkError::InvalidArgument(format!(
                    "error budget must be non-negative, got {}",
                    eps
                )));
            }
        }
        if self.ranks_cp == Some(0) {
            return Err(NetworkError::InvalidArgument(
                "CP rank must be positive".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(NetworkError::InvalidArgument(
                "max_iter must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn cp_als(&self, rank: usize) -> CpAlsOptions {
        CpAlsOptions {
            rank,
            max_iter: self.max_iter,
            tol: self.tol,
            verbose: self.verbose,
        }
    }
}

/// CP-ALS settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpAlsOptions {
    pub rank: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub verbose: bool,
}

impl CpAlsOptions {
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            max_iter: 25,
            tol: 1e-4,
            verbose: false,
        }
    }
}

/// Exact TT cores of a dense array, without compression.
///
/// At each step the current unfolding is either emitted as a core (when it
/// has at least as many rows as columns, carrying an identity to the right)
/// or replaced by an identity core (carrying the data to the right). The
/// bond ranks are therefore `min(∏ leading sizes, ∏ trailing sizes)`.
pub fn full_rank_cores(data: &DenseND<f64>) -> Result<Vec<Array3<f64>>> {
    let data = prepare(data)?;
    let shape = data.shape().to_vec();
    let n_axes = shape.len();
    let mut cores = Vec::with_capacity(n_axes);
    let mut rank = 1;
    let mut carried = data.to_vec();

    for &size in shape.iter().take(n_axes - 1) {
        let rows = rank * size;
        let cols = carried.len() / rows;
        if rows < cols {
            cores.push(reshape3(Array2::<f64>::eye(rows).into_iter().collect(), rank, size, rows)?);
            rank = rows;
        } else {
            cores.push(reshape3(carried, rank, size, cols)?);
            carried = Array2::<f64>::eye(cols).into_iter().collect();
            rank = cols;
        }
    }
    cores.push(reshape3(carried, rank, shape[n_axes - 1], 1)?);
    Ok(cores)
}

fn reshape3(values: Vec<f64>, a: usize, b: usize, c: usize) -> Result<Array3<f64>> {
    Array3::from_shape_vec((a, b, c), values)
        .map_err(|e| anyhow::anyhow!("full-rank core reshape failed: {}", e).into())
}

/// Promote 0-d data to shape `[1]` and reject empty axes.
fn prepare(data: &DenseND<f64>) -> Result<DenseND<f64>> {
    if data.rank() == 0 {
        return Ok(DenseND::from_vec(data.to_vec(), &[1])?);
    }
    if data.shape().contains(&0) {
        return Err(NetworkError::InvalidArgument(format!(
            "cannot decompose data with an empty axis: {:?}",
            data.shape()
        )));
    }
    Ok(data.clone())
}

impl TensorNetwork {
    /// Exact full-rank TT network.
    pub fn full_rank(data: &DenseND<f64>) -> Result<Self> {
        Self::from_tt_cores(full_rank_cores(data)?)
    }

    /// TT-SVD: full rank, then rounding to relative error `eps`.
    pub fn tt_svd(data: &DenseND<f64>, eps: f64) -> Result<Self> {
        Self::decompose(data, &DecompositionOptions::default().with_eps(eps))
    }

    /// CP decomposition of the given rank with default ALS settings.
    pub fn cp(data: &DenseND<f64>, rank: usize) -> Result<Self> {
        Self::decompose(data, &DecompositionOptions::default().with_ranks_cp(rank))
    }

    /// Compress dense data according to `options`.
    ///
    /// - `ranks_cp`: CP-ALS, on the Tucker core when `ranks_tucker` is also set
    /// - `eps`: TT-SVD
    /// - otherwise full rank, then optional Tucker and TT rank caps
    ///
    /// # Errors
    ///
    /// Returns `ConflictingOptions` before any computation if the options
    /// contradict each other.
    ///
    /// # Examples
    ///
    /// ```
    /// use tnet_core::DenseND;
    /// use tnet_network::{DecompositionOptions, TensorNetwork};
    ///
    /// let data = DenseND::<f64>::ones(&[3, 4, 5]);
    /// let t = TensorNetwork::decompose(&data, &DecompositionOptions::default().with_ranks_tt(1)).unwrap();
    /// assert_eq!(t.ranks_tt(), vec![1, 1, 1, 1]);
    /// ```
    pub fn decompose(data: &DenseND<f64>, options: &DecompositionOptions) -> Result<Self> {
        options.validate()?;
        let data = prepare(data)?;

        if let Some(rank) = options.ranks_cp {
            debug!("decompose {:?}: CP-ALS with rank {}", data.shape(), rank);
            return cp_als(&data, &options.cp_als(rank), options.ranks_tucker.as_ref());
        }

        let mut t = Self::full_rank(&data)?;
        if let Some(eps) = options.eps {
            debug!("decompose {:?}: TT-SVD with eps {}", data.shape(), eps);
            t.round_with(&RoundingOptions::with_eps(eps).with_algorithm(options.algorithm))?;
            return Ok(t);
        }
        if let Some(ranks) = &options.ranks_tucker {
            let opts = RoundingOptions::with_ranks(ranks.clone()).with_algorithm(options.algorithm);
            t.round_tucker(&opts, None)?;
        }
        if let Some(ranks) = &options.ranks_tt {
            let opts = RoundingOptions::with_ranks(ranks.clone()).with_algorithm(options.algorithm);
            t.round_tt(&opts)?;
        }
        Ok(t)
    }
}

/// CP decomposition by alternating least squares.
///
/// With `ranks_tucker` the data is first Tucker-truncated and ALS runs on the
/// Tucker core; the factors are kept on the result. Stopping at `max_iter`
/// without converging is not an error: the last iterate is returned.
pub fn cp_als(
    data: &DenseND<f64>,
    options: &CpAlsOptions,
    ranks_tucker: Option<&Ranks>,
) -> Result<TensorNetwork> {
    if options.rank == 0 {
        return Err(NetworkError::InvalidArgument(
            "CP rank must be positive".to_string(),
        ));
    }
    let data = prepare(data)?;
    let rank = options.rank;

    let (target, tucker_factors, mut factors) = match ranks_tucker {
        Some(ranks) => {
            let mut t = TensorNetwork::full_rank(&data)?;
            t.round_tucker(&RoundingOptions::with_ranks(ranks.clone()), None)?;
            let core = t.tucker_core()?;
            let mut init = Vec::with_capacity(core.rank());
            for &size in core.shape() {
                init.push(DenseND::<f64>::random_normal(&[size, rank], 0.0, 1.0).into_matrix()?);
            }
            (core, t.factors.clone(), init)
        }
        None => {
            let init = hosvd_init(&data, rank)?;
            let n_axes = data.rank();
            (data, vec![None; n_axes], init)
        }
    };

    let n_axes = target.rank();
    let shape = target.shape().to_vec();
    let target_norm = target.frobenius_norm();
    let scale = if target_norm > 0.0 { target_norm } else { 1.0 };
    let unfoldings = (0..n_axes)
        .map(|n| target.unfold(n))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut errors: Vec<f64> = Vec::new();
    let mut converged = false;
    for iter in 0..options.max_iter {
        for n in 0..n_axes {
            let mut khatri = Array2::<f64>::ones((1, rank));
            let mut prod = Array2::<f64>::ones((rank, rank));
            for m in (0..n_axes).rev().filter(|&m| m != n) {
                khatri = khatri_rao(&factors[m].view(), &khatri.view());
                prod = prod * factors[m].t().dot(&factors[m]);
            }
            let rhs = unfoldings[n].dot(&khatri);
            factors[n] = least_squares(&prod.view(), &rhs.t())?.t().to_owned();
        }

        let approx = TensorNetwork::from_cp_factors(factors.clone())?.full()?;
        let error = (&approx - &target).frobenius_norm() / scale;
        if options.verbose {
            info!("CP-ALS iteration {}: relative error {:.6e}", iter + 1, error);
        } else {
            debug!("CP-ALS iteration {}: relative error {:.6e}", iter + 1, error);
        }
        errors.push(error);
        if errors.len() >= 2 && errors[errors.len() - 2] - error < options.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "CP-ALS did not converge after {} iterations (shape {:?}, rank {}, error {:.3e})",
            options.max_iter,
            shape,
            rank,
            errors.last().copied().unwrap_or(f64::NAN)
        );
    }

    let cores = factors.into_iter().map(Core::Cp).collect();
    TensorNetwork::from_parts(cores, tucker_factors, None)
}

/// Leading eigenvectors of each mode's Gram matrix, padded with small random
/// columns when the rank exceeds the mode size.
fn hosvd_init(data: &DenseND<f64>, rank: usize) -> Result<Vec<Array2<f64>>> {
    let mut factors = Vec::with_capacity(data.rank());
    for n in 0..data.rank() {
        let unfolding = data.unfold(n)?;
        let gram = unfolding.dot(&unfolding.t());
        let leading = dominant_eigenvectors(&gram.view(), rank)?;
        let size = leading.nrows();
        let found = leading.ncols();
        if found == rank {
            factors.push(leading);
            continue;
        }
        let padding =
            DenseND::<f64>::random_normal(&[size, rank - found], 0.0, INIT_PADDING_SCALE)
                .into_matrix()?;
        let mut factor = Array2::<f64>::zeros((size, rank));
        factor.slice_mut(s![.., ..found]).assign(&leading);
        factor.slice_mut(s![.., found..]).assign(&padding);
        factors.push(factor);
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_two(shape: &[usize]) -> DenseND<f64> {
        let total: usize = shape.iter().product();
        let mut values = Vec::with_capacity(total);
        for flat in 0..total {
            let mut rem = flat;
            let mut first = 1.0;
            let mut second = 1.0;
            for (ax, &s) in shape.iter().enumerate().rev() {
                let i = (rem % s) as f64;
                rem /= s;
                first *= 1.0 + 0.3 * i + ax as f64 * 0.1;
                second *= (0.7 * i + ax as f64).cos();
            }
            values.push(first + second);
        }
        DenseND::from_vec(values, shape).unwrap()
    }

    fn rel_err(t: &TensorNetwork, data: &DenseND<f64>) -> f64 {
        (&t.full().unwrap() - data).frobenius_norm() / data.frobenius_norm()
    }

    #[test]
    fn test_full_rank_ranks_and_exactness() {
        let data = rank_two(&[2, 3, 4]);
        let cores = full_rank_cores(&data).unwrap();
        let dims: Vec<_> = cores.iter().map(|c| c.dim()).collect();
        assert_eq!(dims, vec![(1, 2, 2), (2, 3, 4), (4, 4, 1)]);

        let t = TensorNetwork::full_rank(&data).unwrap();
        assert_eq!(t.ranks_tt(), vec![1, 2, 4, 1]);
        assert!(rel_err(&t, &data) < 1e-14);
    }

    #[test]
    fn test_zero_dimensional_promoted() {
        let scalar = DenseND::from_vec(vec![3.5], &[]).unwrap();
        let t = TensorNetwork::full_rank(&scalar).unwrap();
        assert_eq!(t.shape(), vec![1]);
        assert!((t.sum() - 3.5).abs() < 1e-14);
    }

    #[test]
    fn test_empty_axis_rejected() {
        let empty = DenseND::<f64>::zeros(&[3, 0]);
        assert!(matches!(
            TensorNetwork::full_rank(&empty),
            Err(NetworkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_conflicting_options() {
        let data = rank_two(&[2, 3]);
        let eps_and_rank = DecompositionOptions::default().with_eps(1e-3).with_ranks_tt(2);
        assert!(matches!(
            TensorNetwork::decompose(&data, &eps_and_rank),
            Err(NetworkError::ConflictingOptions(_))
        ));
        let cp_and_tt = DecompositionOptions::default().with_ranks_cp(2).with_ranks_tt(2);
        assert!(matches!(
            cp_and_tt.validate(),
            Err(NetworkError::ConflictingOptions(_))
        ));
        assert!(DecompositionOptions::default().with_max_iter(0).validate().is_err());
    }

    #[test]
    fn test_tt_svd_compresses_rank_two() {
        let data = rank_two(&[4, 5, 6]);
        let t = TensorNetwork::tt_svd(&data, 1e-10).unwrap();
        assert!(t.ranks_tt().iter().all(|&r| r <= 2));
        assert!(rel_err(&t, &data) < 1e-9);
    }

    #[test]
    fn test_tucker_then_tt_caps() {
        let data = rank_two(&[4, 5, 6]);
        let opts = DecompositionOptions::default().with_ranks_tucker(2).with_ranks_tt(2);
        let t = TensorNetwork::decompose(&data, &opts).unwrap();
        assert_eq!(t.ranks_tucker(), vec![2, 2, 2]);
        assert!(t.ranks_tt().iter().all(|&r| r <= 2));
        assert!(rel_err(&t, &data) < 1e-8);
    }

    #[test]
    fn test_cp_als_recovers_rank_two() {
        let data = rank_two(&[4, 5, 6]);
        let opts = DecompositionOptions::default()
            .with_ranks_cp(2)
            .with_max_iter(200)
            .with_tol(1e-12);
        let t = TensorNetwork::decompose(&data, &opts).unwrap();
        assert!(t.cores().iter().all(Core::is_cp));
        assert_eq!(t.format().to_string(), "CP");
        assert!(rel_err(&t, &data) < 1e-3);
    }

    #[test]
    fn test_cp_als_rank_exceeding_mode_size() {
        let data = rank_two(&[2, 3, 4]);
        let opts = CpAlsOptions {
            max_iter: 200,
            tol: 1e-12,
            ..CpAlsOptions::new(3)
        };
        let t = cp_als(&data, &opts, None).unwrap();
        assert_eq!(t.ranks_tt(), vec![3, 3, 3, 3]);
        assert!(rel_err(&t, &data) < 1e-2);
    }

    #[test]
    fn test_cp_als_on_tucker_core() {
        let data = rank_two(&[5, 6, 7]);
        let opts = DecompositionOptions::default()
            .with_ranks_cp(2)
            .with_ranks_tucker(2)
            .with_max_iter(200)
            .with_tol(1e-12);
        let t = TensorNetwork::decompose(&data, &opts).unwrap();
        assert_eq!(t.shape(), vec![5, 6, 7]);
        assert_eq!(t.ranks_tucker(), vec![2, 2, 2]);
        assert!(t.factors().iter().all(Option::is_some));
        assert!(t.cores().iter().all(Core::is_cp));
        assert!(rel_err(&t, &data) < 1e-2);
    }
}
