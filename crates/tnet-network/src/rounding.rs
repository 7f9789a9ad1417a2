//! Orthogonalisation and rank truncation
//!
//! # Algorithms
//!
//! ## TT rounding
//! Left-orthogonalise the whole chain, then sweep right to left truncating
//! each bond with an SVD of the core's right unfolding. The per-bond budget
//! `δ = ε / √(N−1) · ‖X‖` keeps the total relative error below `ε`.
//!
//! ## Tucker rounding
//! Sweep right to left moving each core's non-orthogonal part into its Tucker
//! factor (QR of the `(r_left · r_right, S)` matricisation), truncate the
//! factor with an SVD and push the remainder back into the core.
//!
//! ## Combined rounding
//! [`TensorNetwork::round`] runs TT rounding first and spends whatever budget
//! is left on Tucker rounding.

use crate::core::Core;
use crate::error::{NetworkError, Result};
use crate::network::TensorNetwork;
use log::debug;
use scirs2_core::ndarray_ext::{Array2, Array3};
use tnet_kernels::linalg::{qr, truncated_svd, SvdBudget, TruncationAlgorithm};
use tnet_kernels::tt_ops::{
    absorb_left, absorb_right, fold_right, right_unfolding, swap_trailing_axes,
    tt_left_orthogonalize_core, tt_right_orthogonalize_core,
};

/// A rank cap: one value for every position or one value per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ranks {
    Uniform(usize),
    PerAxis(Vec<usize>),
}

impl Ranks {
    /// Expand to exactly `len` caps.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if a per-axis list has the wrong length or a
    /// cap is zero.
    pub fn expand(&self, len: usize) -> Result<Vec<usize>> {
        let caps = match self {
            Ranks::Uniform(r) => vec![*r; len],
            Ranks::PerAxis(rs) => {
                if rs.len() != len {
                    return Err(NetworkError::InvalidArgument(format!(
                        "{} ranks given where {} are needed",
                        rs.len(),
                        len
                    )));
                }
                rs.clone()
            }
        };
        if caps.contains(&0) {
            return Err(NetworkError::InvalidArgument(
                "rank caps must be positive".to_string(),
            ));
        }
        Ok(caps)
    }
}

impl From<usize> for Ranks {
    fn from(r: usize) -> Self {
        Ranks::Uniform(r)
    }
}

impl From<Vec<usize>> for Ranks {
    fn from(rs: Vec<usize>) -> Self {
        Ranks::PerAxis(rs)
    }
}

impl From<&[usize]> for Ranks {
    fn from(rs: &[usize]) -> Self {
        Ranks::PerAxis(rs.to_vec())
    }
}

/// Rounding configuration.
///
/// # Examples
///
/// ```
/// use tnet_network::{RoundingOptions, TruncationAlgorithm};
///
/// let opts = RoundingOptions::with_eps(1e-6).with_rmax(8);
/// assert_eq!(opts.algorithm, TruncationAlgorithm::Svd);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoundingOptions {
    /// Relative error budget (0 keeps every nonzero singular value)
    pub eps: f64,
    /// Optional rank cap
    pub rmax: Option<Ranks>,
    pub algorithm: TruncationAlgorithm,
}

impl Default for RoundingOptions {
    fn default() -> Self {
        Self {
            eps: 0.0,
            rmax: None,
            algorithm: TruncationAlgorithm::Svd,
        }
    }
}

impl RoundingOptions {
    pub fn with_eps(eps: f64) -> Self {
        Self {
            eps,
            ..Default::default()
        }
    }

    /// Pure rank truncation (no error budget).
    pub fn with_ranks(rmax: impl Into<Ranks>) -> Self {
        Self {
            rmax: Some(rmax.into()),
            ..Default::default()
        }
    }

    pub fn with_rmax(mut self, rmax: impl Into<Ranks>) -> Self {
        self.rmax = Some(rmax.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: TruncationAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.eps.is_nan() || self.eps < 0.0 || self.eps.is_infinite() {
            return Err(NetworkError::InvalidArgument(format!(
                "error budget must be a non-negative number, got {}",
                self.eps
            )));
        }
        Ok(())
    }

    fn caps(&self, len: usize) -> Result<Vec<Option<usize>>> {
        Ok(match &self.rmax {
            Some(r) => r.expand(len)?.into_iter().map(Some).collect(),
            None => vec![None; len],
        })
    }
}

impl TensorNetwork {
    /// Make the Tucker factor of axis `mu` orthonormal, moving its `R` into the core.
    pub fn factor_orthogonalize(&mut self, mu: usize) -> Result<()> {
        self.check_axis(mu)?;
        if let Some(u) = &self.factors[mu] {
            let (q, r) = qr(&u.view())?;
            self.cores[mu] = self.cores[mu].mode_product(&r)?;
            self.factors[mu] = Some(q);
        }
        Ok(())
    }

    /// Left-orthogonalise core `mu` and push the remainder into core `mu + 1`.
    ///
    /// Returns the remainder `R`. Both cores end up in TT format.
    pub fn left_orthogonalize(&mut self, mu: usize) -> Result<Array2<f64>> {
        if mu + 1 >= self.ndim() {
            return Err(NetworkError::InvalidArgument(format!(
                "cannot left-orthogonalize core {} of a {}-way network",
                mu,
                self.ndim()
            )));
        }
        self.factor_orthogonalize(mu)?;
        let (q, r) = tt_left_orthogonalize_core(&self.cores[mu].to_tt())?;
        self.cores[mu] = Core::Tt(q);
        self.cores[mu + 1] = Core::Tt(absorb_left(&r, &self.cores[mu + 1].to_tt())?);
        Ok(r)
    }

    /// Right-orthogonalise core `mu` and push the remainder into core `mu - 1`.
    ///
    /// Returns the remainder `L`. Both cores end up in TT format.
    pub fn right_orthogonalize(&mut self, mu: usize) -> Result<Array2<f64>> {
        if mu == 0 || mu >= self.ndim() {
            return Err(NetworkError::InvalidArgument(format!(
                "cannot right-orthogonalize core {} of a {}-way network",
                mu,
                self.ndim()
            )));
        }
        self.factor_orthogonalize(mu)?;
        let (l, q) = tt_right_orthogonalize_core(&self.cores[mu].to_tt())?;
        self.cores[mu] = Core::Tt(q);
        self.cores[mu - 1] = Core::Tt(absorb_right(&self.cores[mu - 1].to_tt(), &l)?);
        Ok(l)
    }

    /// Bring the network into canonical TT form with its norm concentrated in core `mu`.
    ///
    /// Cores before `mu` become left-orthogonal and cores after it
    /// right-orthogonal. Returns the last `R` and `L` remainders (1×1 identity
    /// when no step was taken on that side).
    pub fn orthogonalize(&mut self, mu: usize) -> Result<(Array2<f64>, Array2<f64>)> {
        self.check_axis(mu)?;
        self.canonicalize_tt();
        let mut r = Array2::<f64>::eye(1);
        let mut l = Array2::<f64>::eye(1);
        for i in 0..mu {
            r = self.left_orthogonalize(i)?;
        }
        for i in (mu + 1..self.ndim()).rev() {
            l = self.right_orthogonalize(i)?;
        }
        Ok((r, l))
    }

    /// [`TensorNetwork::orthogonalize`] on the last core.
    pub fn orthogonalize_last(&mut self) -> Result<(Array2<f64>, Array2<f64>)> {
        self.orthogonalize(self.ndim() - 1)
    }

    /// Truncate the bond ranks under a relative error budget and optional caps.
    ///
    /// `rmax`, when per-axis, has `N − 1` entries (one per inner bond).
    pub fn round_tt(&mut self, options: &RoundingOptions) -> Result<()> {
        options.validate()?;
        let n_axes = self.ndim();
        let caps = options.caps(n_axes - 1)?;
        let before = self.ranks_tt();

        self.orthogonalize_last()?;
        self.factor_orthogonalize(n_axes - 1)?;
        let last_norm = match &self.cores[n_axes - 1] {
            Core::Tt(g) => g.iter().map(|x| x * x).sum::<f64>().sqrt(),
            Core::Cp(a) => a.iter().map(|x| x * x).sum::<f64>().sqrt(),
        };
        let delta = options.eps / ((n_axes - 1) as f64).sqrt().max(1.0) * last_norm;

        for mu in (1..n_axes).rev() {
            let g = self.cores[mu].to_tt();
            let (_, n, r_right) = g.dim();
            let (left, right) = truncated_svd(
                &right_unfolding(&g).view(),
                SvdBudget::Absolute(delta),
                caps[mu - 1],
                false,
                options.algorithm,
            )?;
            self.cores[mu] = Core::Tt(fold_right(&right, n, r_right)?);
            self.cores[mu - 1] = Core::Tt(absorb_right(&self.cores[mu - 1].to_tt(), &left)?);
        }

        debug!("round_tt(eps={}): ranks {:?} -> {:?}", options.eps, before, self.ranks_tt());
        Ok(())
    }

    /// Truncate the Tucker ranks of the selected axes (all when `dims` is `None`).
    ///
    /// Axes without a factor receive one (initially the identity). `rmax`, when
    /// per-axis, has `N` entries.
    pub fn round_tucker(&mut self, options: &RoundingOptions, dims: Option<&[usize]>) -> Result<()> {
        options.validate()?;
        let n_axes = self.ndim();
        let all: Vec<usize> = (0..n_axes).collect();
        let dims = dims.unwrap_or(&all);
        if dims.is_empty() {
            return Ok(());
        }
        for &d in dims {
            self.check_axis(d)?;
        }
        let caps = options.caps(n_axes)?;
        let eps = options.eps / (dims.len() as f64).sqrt();
        let before = self.ranks_tucker();

        self.orthogonalize_last()?;
        for mu in (0..n_axes).rev() {
            if dims.contains(&mu) {
                self.truncate_factor(mu, eps, caps[mu], options.algorithm)?;
            }
            if mu > 0 {
                self.right_orthogonalize(mu)?;
            }
        }

        debug!(
            "round_tucker(eps={}): Tucker ranks {:?} -> {:?}",
            options.eps,
            before,
            self.ranks_tucker()
        );
        Ok(())
    }

    /// Move the non-orthogonal part of core `mu` into its factor and truncate it.
    fn truncate_factor(
        &mut self,
        mu: usize,
        eps: f64,
        cap: Option<usize>,
        algorithm: TruncationAlgorithm,
    ) -> Result<()> {
        let g = self.cores[mu].to_tt();
        let (r_left, s, r_right) = g.dim();
        let u = match self.factors[mu].take() {
            Some(u) => u,
            None => Array2::eye(s),
        };

        // (r_left, r_right, S) matricised as (r_left * r_right, S)
        let swapped = swap_trailing_axes(&g);
        let mat = Array2::from_shape_vec((r_left * r_right, s), swapped.into_iter().collect())
            .map_err(|e| anyhow::anyhow!("core matricisation failed: {}", e))?;
        let (q, r) = qr(&mat.view())?;
        let k = q.ncols();
        let q_core = Array3::from_shape_vec((r_left, r_right, k), q.into_iter().collect())
            .map_err(|e| anyhow::anyhow!("core reshape failed: {}", e))?;
        let core = swap_trailing_axes(&q_core);
        let u = u.dot(&r.t());

        let (left, right) =
            truncated_svd(&u.view(), SvdBudget::Relative(eps), cap, true, algorithm)?;
        self.cores[mu] = Core::Tt(core).mode_product(&right)?;
        self.factors[mu] = Some(left);
        Ok(())
    }

    /// Round TT ranks first, then spend the remaining budget on Tucker ranks.
    ///
    /// ```
    /// use tnet_core::DenseND;
    /// use tnet_network::TensorNetwork;
    ///
    /// let data = DenseND::<f64>::ones(&[3, 4, 5]);
    /// let mut t = TensorNetwork::full_rank(&data).unwrap();
    /// t.round(1e-10).unwrap();
    /// assert_eq!(t.ranks_tt(), vec![1, 1, 1, 1]);
    /// ```
    pub fn round(&mut self, eps: f64) -> Result<()> {
        self.round_with(&RoundingOptions::with_eps(eps))
    }

    /// [`TensorNetwork::round`] with explicit options.
    ///
    /// Only `eps` and `algorithm` are used: both stages run without a rank
    /// cap, since a cap would void the error budget split between them. Cap
    /// ranks through [`TensorNetwork::round_tt`] or
    /// [`TensorNetwork::round_tucker`] instead.
    pub fn round_with(&mut self, options: &RoundingOptions) -> Result<()> {
        options.validate()?;
        let snapshot = self.clone();
        let mut tt_options = options.clone();
        tt_options.rmax = None;
        self.round_tt(&tt_options)?;
        let reached = crate::metrics::relative_error(&snapshot, self)?;
        if reached < options.eps {
            let remaining = (1.0 + options.eps) / (1.0 + reached) - 1.0;
            let tucker_options = RoundingOptions {
                eps: remaining,
                rmax: None,
                algorithm: options.algorithm,
            };
            self.round_tucker(&tucker_options, None)?;
        }
        Ok(())
    }

    /// Cap the bond ranks without an error budget.
    pub fn set_ranks_tt(&mut self, rmax: impl Into<Ranks>) -> Result<()> {
        self.round_tt(&RoundingOptions::with_ranks(rmax))
    }

    /// Cap the Tucker ranks without an error budget.
    pub fn set_ranks_tucker(&mut self, rmax: impl Into<Ranks>) -> Result<()> {
        self.round_tucker(&RoundingOptions::with_ranks(rmax), None)
    }

    pub(crate) fn check_axis(&self, mu: usize) -> Result<()> {
        if mu >= self.ndim() {
            return Err(NetworkError::InvalidArgument(format!(
                "axis {} out of range for a {}-way network",
                mu,
                self.ndim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;
    use tnet_core::DenseND;
    use tnet_kernels::tt_ops::left_unfolding;

    fn smooth(shape: &[usize]) -> DenseND<f64> {
        let total: usize = shape.iter().product();
        let mut values = Vec::with_capacity(total);
        for flat in 0..total {
            let mut rem = flat;
            let mut acc = 0.0;
            for (ax, &s) in shape.iter().enumerate().rev() {
                let i = rem % s;
                rem /= s;
                acc += (ax + 1) as f64 * i as f64 / s as f64;
            }
            values.push(1.0 / (1.0 + acc));
        }
        DenseND::from_vec(values, shape).unwrap()
    }

    fn rel_err(a: &TensorNetwork, b: &DenseND<f64>) -> f64 {
        let full = a.full().unwrap();
        (&full - b).frobenius_norm() / b.frobenius_norm()
    }

    fn is_identity(m: &Array2<f64>, tol: f64) -> bool {
        m.indexed_iter().all(|((i, j), &v)| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (v - expected).abs() < tol
        })
    }

    #[test]
    fn test_ranks_expand() {
        assert_eq!(Ranks::from(3).expand(2).unwrap(), vec![3, 3]);
        assert_eq!(Ranks::from(vec![1, 2]).expand(2).unwrap(), vec![1, 2]);
        assert!(Ranks::from(vec![1, 2]).expand(3).is_err());
        assert!(Ranks::from(0).expand(1).is_err());
    }

    #[test]
    fn test_negative_eps_rejected() {
        let mut t = TensorNetwork::full_rank(&smooth(&[2, 3])).unwrap();
        assert!(matches!(
            t.round_tt(&RoundingOptions::with_eps(-1.0)),
            Err(NetworkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_left_orthogonalize_properties() {
        let data = smooth(&[3, 4, 5]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.left_orthogonalize(0).unwrap();
        let q = left_unfolding(t.cores()[0].as_tt().unwrap());
        assert!(is_identity(&q.t().dot(&q), 1e-10));
        assert!(rel_err(&t, &data) < 1e-12);
        assert!(t.left_orthogonalize(2).is_err());
    }

    #[test]
    fn test_right_orthogonalize_properties() {
        let data = smooth(&[3, 4, 5]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.right_orthogonalize(2).unwrap();
        let q = right_unfolding(t.cores()[2].as_tt().unwrap());
        assert!(is_identity(&q.dot(&q.t()), 1e-10));
        assert!(rel_err(&t, &data) < 1e-12);
        assert!(t.right_orthogonalize(0).is_err());
    }

    #[test]
    fn test_orthogonalize_middle() {
        let data = smooth(&[2, 3, 4, 2]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.orthogonalize(1).unwrap();
        for mu in 0..1 {
            let q = left_unfolding(t.cores()[mu].as_tt().unwrap());
            assert!(is_identity(&q.t().dot(&q), 1e-10));
        }
        for mu in 2..4 {
            let q = right_unfolding(t.cores()[mu].as_tt().unwrap());
            assert!(is_identity(&q.dot(&q.t()), 1e-10));
        }
        assert!(rel_err(&t, &data) < 1e-12);
    }

    #[test]
    fn test_orthogonalize_promotes_cp() {
        let mut t = TensorNetwork::from_cp_factors(vec![
            array![[1.0, 2.0], [3.0, 4.0]],
            array![[1.0, -1.0], [0.5, 0.5], [2.0, 0.0]],
            array![[1.0, 1.0], [0.0, 1.0]],
        ])
        .unwrap();
        let expected = t.full().unwrap();
        t.orthogonalize_last().unwrap();
        assert!(t.cores().iter().all(Core::is_tt));
        assert_eq!(t.ranks_tt()[0], 1);
        assert_eq!(t.ranks_tt()[3], 1);
        assert!(t.full().unwrap().max_abs_diff(&expected).unwrap() < 1e-12);
    }

    #[test]
    fn test_factor_orthogonalize() {
        let core = Core::Tt(Array3::from_shape_fn((1, 2, 1), |(_, j, _)| 1.0 + j as f64));
        let u = array![[2.0, 0.0], [1.0, 1.0], [0.0, 3.0]];
        let mut t = TensorNetwork::from_cores_with_factors(vec![core], vec![Some(u)]).unwrap();
        let expected = t.full().unwrap();
        t.factor_orthogonalize(0).unwrap();
        let q = t.factors()[0].as_ref().unwrap();
        assert!(is_identity(&q.t().dot(q), 1e-10));
        assert!(t.full().unwrap().max_abs_diff(&expected).unwrap() < 1e-12);
    }

    #[test]
    fn test_round_tt_exact_low_rank() {
        // Separable data has TT rank one everywhere
        let data = DenseND::from_vec(
            (0..60)
                .map(|flat| {
                    let (i, j, k) = (flat / 20, (flat / 5) % 4, flat % 5);
                    (1.0 + i as f64) * (2.0 - j as f64) * (0.5 + k as f64)
                })
                .collect(),
            &[3, 4, 5],
        )
        .unwrap();
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.round_tt(&RoundingOptions::with_eps(1e-10)).unwrap();
        assert_eq!(t.ranks_tt(), vec![1, 1, 1, 1]);
        assert!(rel_err(&t, &data) < 1e-10);
    }

    #[test]
    fn test_round_tt_rank_cap() {
        let data = smooth(&[4, 5, 6]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.set_ranks_tt(2).unwrap();
        assert!(t.ranks_tt().iter().all(|&r| r <= 2));
        assert!(rel_err(&t, &data) < 0.1);
    }

    #[test]
    fn test_round_tt_idempotent() {
        let data = smooth(&[4, 5, 6]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.round_tt(&RoundingOptions::with_eps(1e-3)).unwrap();
        let ranks = t.ranks_tt();
        let once = t.full().unwrap();
        t.round_tt(&RoundingOptions::with_eps(1e-3)).unwrap();
        assert!(t.ranks_tt().iter().zip(ranks.iter()).all(|(a, b)| a <= b));
        let twice = t.full().unwrap();
        assert!((&twice - &once).frobenius_norm() / once.frobenius_norm() < 2e-3);
    }

    #[test]
    fn test_round_tucker_caps_ranks() {
        let data = smooth(&[5, 6, 7]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.set_ranks_tucker(3).unwrap();
        assert_eq!(t.ranks_tucker(), vec![3, 3, 3]);
        assert!(t.factors().iter().all(Option::is_some));
        assert!(rel_err(&t, &data) < 0.05);
    }

    #[test]
    fn test_round_tucker_selected_dims() {
        let data = smooth(&[5, 6, 7]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.round_tucker(&RoundingOptions::with_ranks(2), Some(&[1])).unwrap();
        assert!(t.factors()[0].is_none());
        assert!(t.factors()[1].is_some());
        assert!(t.factors()[2].is_none());
        assert_eq!(t.ranks_tucker()[1], 2);
        assert!(t.round_tucker(&RoundingOptions::default(), Some(&[5])).is_err());
    }

    #[test]
    fn test_round_with_eig_algorithm() {
        let data = smooth(&[4, 5, 6]);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        let opts = RoundingOptions::with_eps(1e-4).with_algorithm(TruncationAlgorithm::Eig);
        t.round_with(&opts).unwrap();
        assert!(rel_err(&t, &data) < 1e-3);
    }

    fn scrambled(shape: &[usize], seed: usize) -> DenseND<f64> {
        let total: usize = shape.iter().product();
        let values = (0..total)
            .map(|k| ((seed + 37 * k + (k * k) % 13) % 101) as f64 / 101.0 - 0.5)
            .collect();
        DenseND::from_vec(values, shape).unwrap()
    }

    #[test]
    fn test_round_tt_budget_on_unbalanced_unfoldings() {
        let data = scrambled(&[4, 3, 5, 3], 77);
        for &eps in &[0.0, 1e-3, 1e-2] {
            let mut t = TensorNetwork::full_rank(&data).unwrap();
            t.round_tt(&RoundingOptions::with_eps(eps)).unwrap();
            let err = rel_err(&t, &data);
            assert!(err <= eps + 1e-12, "eps {} reached {}", eps, err);

            let mut t = TensorNetwork::full_rank(&data).unwrap();
            t.round(eps).unwrap();
            let err = rel_err(&t, &data);
            assert!(err <= eps + 1e-12, "combined eps {} reached {}", eps, err);
        }
    }

    #[test]
    fn test_round_with_ignores_rank_cap() {
        let data = scrambled(&[4, 3, 5], 3);
        let mut t = TensorNetwork::full_rank(&data).unwrap();
        t.round_with(&RoundingOptions::with_eps(0.0).with_rmax(1)).unwrap();
        assert!(rel_err(&t, &data) < 1e-12);
    }
}
