//! The tensor network entity
//!
//! A [`TensorNetwork`] represents an N-way array as a chain of per-axis
//! cores, each optionally compressed further by a Tucker factor:
//!
//! ```text
//! X(i₁, …, iₙ) = 1ᵀ · G₁[i₁] · G₂[i₂] ⋯ Gₙ[iₙ] · 1
//! Gₖ[iₖ] = Σ_s Uₖ[iₖ, s] · Cₖ[:, s, :]        (when axis k has a factor Uₖ)
//! ```
//!
//! Both boundary vectors are all-ones of the boundary rank, so pure CP
//! networks (boundary rank R) and TT networks (boundary rank 1) follow from
//! the same rule.

use crate::core::Core;
use crate::error::{NetworkError, Result};
use log::debug;
use scirs2_core::ndarray_ext::{Array2, Array3, Axis};
use tnet_core::DenseND;

/// Hybrid TT / CP / Tucker tensor network.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::Array2;
/// use tnet_network::{Core, TensorNetwork};
///
/// // Rank-1 CP network of ones over a 2×3 grid
/// let t = TensorNetwork::from_cores(vec![
///     Core::Cp(Array2::ones((2, 1))),
///     Core::Cp(Array2::ones((3, 1))),
/// ])
/// .unwrap();
/// assert_eq!(t.shape(), vec![2, 3]);
/// assert_eq!(t.full().unwrap().to_vec(), vec![1.0; 6]);
/// ```
#[derive(Debug, Clone)]
pub struct TensorNetwork {
    pub(crate) cores: Vec<Core>,
    pub(crate) factors: Vec<Option<Array2<f64>>>,
    pub(crate) labels: Vec<Vec<usize>>,
}

/// Which formats a network currently mixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkFormat {
    pub tt: bool,
    pub cp: bool,
    pub tucker: bool,
}

impl std::fmt::Display for NetworkFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [(self.tt, "TT"), (self.cp, "CP"), (self.tucker, "Tucker")]
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", parts.join("-"))
    }
}

impl TensorNetwork {
    /// Build a network from cores alone (no Tucker factors, default labels).
    pub fn from_cores(cores: Vec<Core>) -> Result<Self> {
        let n = cores.len();
        Self::from_parts(cores, vec![None; n], None)
    }

    /// Build a network from cores and optional per-axis Tucker factors.
    pub fn from_cores_with_factors(
        cores: Vec<Core>,
        factors: Vec<Option<Array2<f64>>>,
    ) -> Result<Self> {
        Self::from_parts(cores, factors, None)
    }

    /// Build a pure TT network.
    pub fn from_tt_cores(cores: Vec<Array3<f64>>) -> Result<Self> {
        Self::from_cores(cores.into_iter().map(Core::Tt).collect())
    }

    /// Build a pure CP network from its factor matrices `(I_n, R)`.
    pub fn from_cp_factors(factors: Vec<Array2<f64>>) -> Result<Self> {
        Self::from_cores(factors.into_iter().map(Core::Cp).collect())
    }

    /// Validate and assemble a network.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty core list
    /// - `ShapeMismatch` when factor or label counts/sizes disagree with the cores
    /// - `RankMismatch` when adjacent cores disagree on their shared rank
    pub fn from_parts(
        cores: Vec<Core>,
        factors: Vec<Option<Array2<f64>>>,
        labels: Option<Vec<Vec<usize>>>,
    ) -> Result<Self> {
        if cores.is_empty() {
            return Err(NetworkError::InvalidArgument(
                "a tensor network needs at least one core".to_string(),
            ));
        }
        if factors.len() != cores.len() {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} factors given for {} cores",
                factors.len(),
                cores.len()
            )));
        }
        for n in 0..cores.len().saturating_sub(1) {
            let (left_rank, right_rank) = (cores[n].right_rank(), cores[n + 1].left_rank());
            if left_rank != right_rank {
                return Err(NetworkError::RankMismatch {
                    left: n,
                    right: n + 1,
                    left_rank,
                    right_rank,
                });
            }
        }
        for (n, (core, factor)) in cores.iter().zip(factors.iter()).enumerate() {
            if let Some(u) = factor {
                if u.ncols() != core.middle_size() {
                    return Err(NetworkError::ShapeMismatch(format!(
                        "factor {} has {} columns but its core has middle size {}",
                        n,
                        u.ncols(),
                        core.middle_size()
                    )));
                }
            }
        }

        let mut network = Self {
            cores,
            factors,
            labels: Vec::new(),
        };
        let shape = network.shape();
        network.labels = match labels {
            Some(labels) => {
                if labels.len() != shape.len()
                    || labels.iter().zip(shape.iter()).any(|(l, &s)| l.len() != s)
                {
                    return Err(NetworkError::ShapeMismatch(format!(
                        "labels do not match the network shape {:?}",
                        shape
                    )));
                }
                labels
            }
            None => shape.iter().map(|&s| (0..s).collect()).collect(),
        };
        Ok(network)
    }

    /// Replace the per-axis labels used by mask indexing.
    pub fn with_labels(self, labels: Vec<Vec<usize>>) -> Result<Self> {
        Self::from_parts(self.cores, self.factors, Some(labels))
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn factors(&self) -> &[Option<Array2<f64>>] {
        &self.factors
    }

    pub fn labels(&self) -> &[Vec<usize>] {
        &self.labels
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.cores.len()
    }

    /// Logical shape: factor rows where a factor exists, core middle size otherwise.
    pub fn shape(&self) -> Vec<usize> {
        self.cores
            .iter()
            .zip(self.factors.iter())
            .map(|(core, factor)| match factor {
                Some(u) => u.nrows(),
                None => core.middle_size(),
            })
            .collect()
    }

    /// Bond ranks: `N + 1` entries, the left rank of every core then the right
    /// rank of the last one.
    pub fn ranks_tt(&self) -> Vec<usize> {
        let mut ranks: Vec<usize> = self.cores.iter().map(Core::left_rank).collect();
        ranks.push(self.cores[self.cores.len() - 1].right_rank());
        ranks
    }

    /// Tucker ranks: the middle size of every core.
    pub fn ranks_tucker(&self) -> Vec<usize> {
        self.cores.iter().map(Core::middle_size).collect()
    }

    /// Number of entries of the represented array.
    pub fn numel(&self) -> usize {
        self.shape().iter().product()
    }

    /// Number of stored coefficients (cores plus factors).
    pub fn numcoef(&self) -> usize {
        let cores: usize = self.cores.iter().map(Core::len).sum();
        let factors: usize = self.factors.iter().flatten().map(|u| u.len()).sum();
        cores + factors
    }

    pub fn format(&self) -> NetworkFormat {
        NetworkFormat {
            tt: self.cores.iter().any(Core::is_tt),
            cp: self.cores.iter().any(Core::is_cp),
            tucker: self.factors.iter().any(Option::is_some),
        }
    }

    /// Contract Tucker factors into their cores.
    ///
    /// `dims` selects the axes to decompress (all when `None`).
    pub fn decompress_tucker_factors(&self, dims: Option<&[usize]>) -> Result<Self> {
        let mut t = self.clone();
        let all: Vec<usize> = (0..self.ndim()).collect();
        for &n in dims.unwrap_or(&all) {
            if n >= self.ndim() {
                return Err(NetworkError::InvalidArgument(format!(
                    "axis {} out of range for a {}-way network",
                    n,
                    self.ndim()
                )));
            }
            if let Some(u) = t.factors[n].take() {
                t.cores[n] = t.cores[n].mode_product(&u)?;
            }
        }
        Ok(t)
    }

    /// Cast to a pure TT network: factors decompressed, every core promoted,
    /// boundary ranks summed to one.
    pub fn tt(&self) -> Result<Self> {
        let mut t = self.decompress_tucker_factors(None)?;
        t.canonicalize_tt();
        Ok(t)
    }

    /// Dense Tucker core: the network with its factors dropped, reconstructed.
    pub fn tucker_core(&self) -> Result<DenseND<f64>> {
        let n = self.ndim();
        let bare = Self::from_parts(self.cores.clone(), vec![None; n], None)?;
        bare.full()
    }

    /// Promote every core to TT and collapse boundary ranks to one.
    ///
    /// The first and last CP cores become `(1, n, R)` and `(R, n, 1)` instead
    /// of the diagonal `(R, n, R)` form.
    pub(crate) fn canonicalize_tt(&mut self) {
        let n_axes = self.cores.len();
        for (mu, core) in self.cores.iter_mut().enumerate() {
            if let Core::Cp(a) = core {
                let tt = if n_axes == 1 {
                    a.sum_axis(Axis(1)).insert_axis(Axis(1)).insert_axis(Axis(0))
                } else if mu == 0 {
                    a.clone().insert_axis(Axis(0))
                } else if mu == n_axes - 1 {
                    a.clone().insert_axis(Axis(2)).permuted_axes([1, 0, 2])
                } else {
                    tnet_kernels::tt_ops::cp_to_tt(a)
                };
                *core = Core::Tt(tt.as_standard_layout().to_owned());
            }
        }
        if let Core::Tt(first) = &mut self.cores[0] {
            if first.shape()[0] > 1 {
                *first = first.sum_axis(Axis(0)).insert_axis(Axis(0));
            }
        }
        if let Core::Tt(last) = &mut self.cores[n_axes - 1] {
            if last.shape()[2] > 1 {
                *last = last.sum_axis(Axis(2)).insert_axis(Axis(2));
            }
        }
    }

    /// Reconstruct the full dense array.
    ///
    /// Cost is proportional to the number of entries; intended for small
    /// networks, tests and error measurements.
    pub fn full(&self) -> Result<DenseND<f64>> {
        let t = self.decompress_tucker_factors(None)?;
        let shape = t.shape();

        let mut acc = Array2::<f64>::ones((1, t.cores[0].left_rank()));
        for core in &t.cores {
            let prefix = acc.nrows();
            acc = match core {
                Core::Tt(g) => {
                    let (_, n, r_right) = g.dim();
                    let product = acc.dot(&tnet_kernels::tt_ops::right_unfolding(g));
                    Array2::from_shape_vec((prefix * n, r_right), product.into_iter().collect())
                        .map_err(|e| anyhow::anyhow!("reconstruction reshape failed: {}", e))?
                }
                Core::Cp(a) => {
                    let (n, rank) = a.dim();
                    Array2::from_shape_fn((prefix * n, rank), |(row, r)| {
                        acc[[row / n, r]] * a[[row % n, r]]
                    })
                }
            };
        }

        let values = acc.sum_axis(Axis(1));
        Ok(DenseND::from_vec(values.to_vec(), &shape)?)
    }

    /// Tile the network along its axes.
    ///
    /// `reps[n]` copies of axis `n`; entries beyond the network's
    /// dimensionality append new constant axes (CP cores of ones).
    pub fn repeat(&self, reps: &[usize]) -> Result<Self> {
        let n_axes = self.ndim();
        if reps.len() < n_axes {
            return Err(NetworkError::InvalidArgument(format!(
                "{} repetitions given for a {}-way network",
                reps.len(),
                n_axes
            )));
        }
        if reps.contains(&0) {
            return Err(NetworkError::InvalidArgument(
                "repetition counts must be positive".to_string(),
            ));
        }

        let mut t = self.clone();
        for n in 0..n_axes {
            let r = reps[n];
            if r == 1 {
                continue;
            }
            match &t.factors[n] {
                Some(u) => {
                    let rows = u.nrows();
                    let tiled = Array2::from_shape_fn((rows * r, u.ncols()), |(i, j)| {
                        u[[i % rows, j]]
                    });
                    t.factors[n] = Some(tiled);
                }
                None => t.cores[n] = t.cores[n].tile_middle(r),
            }
            let base = t.labels[n].clone();
            t.labels[n] = (0..r).flat_map(|_| base.iter().copied()).collect();
        }
        for &r in &reps[n_axes..] {
            let rank = t.cores[t.cores.len() - 1].right_rank();
            t.cores.push(Core::Cp(Array2::ones((r, rank))));
            t.factors.push(None);
            t.labels.push((0..r).collect());
        }
        debug!("repeat {:?}: shape {:?} -> {:?}", reps, self.shape(), t.shape());
        Ok(t)
    }
}
