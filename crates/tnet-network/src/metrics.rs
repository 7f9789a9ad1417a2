//! Reductions and comparisons computed in compressed form
//!
//! None of these operations reconstruct the dense array: sums and inner
//! products contract the cores left to right, the norm reads the Frobenius
//! norm of the last core after orthogonalisation.

use crate::core::Core;
use crate::error::{NetworkError, Result};
use crate::network::TensorNetwork;
use scirs2_core::ndarray_ext::{Array1, Array3, Axis};
use tnet_kernels::tt_ops::tt_dot;

/// Entries below this are treated as zero when enumerating accepted inputs.
const ACCEPT_THRESHOLD: f64 = 1e-8;

impl TensorNetwork {
    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        let mut running = Array1::<f64>::ones(self.cores[0].left_rank());
        for (core, factor) in self.cores.iter().zip(self.factors.iter()) {
            let weights = match factor {
                Some(u) => u.sum_axis(Axis(0)),
                None => Array1::ones(core.middle_size()),
            };
            running = core.weighted_middle_sum(&weights).apply_left(&running);
        }
        running.sum()
    }

    /// Inner product `Σ x[i] · y[i]`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the shapes differ.
    pub fn dot(&self, other: &TensorNetwork) -> Result<f64> {
        if self.shape() != other.shape() {
            return Err(NetworkError::ShapeMismatch(format!(
                "dot product of {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        let x: Vec<_> = self.tt()?.cores.into_iter().map(Core::into_tt).collect();
        let y: Vec<_> = other.tt()?.cores.into_iter().map(Core::into_tt).collect();
        Ok(tt_dot(&x, &y)?)
    }

    /// Frobenius norm, computed by orthogonalising a copy of the network.
    pub fn norm(&self) -> Result<f64> {
        let mut t = self.clone();
        t.orthogonalize_last()?;
        t.factor_orthogonalize(t.ndim() - 1)?;
        let last = &t.cores[t.ndim() - 1];
        Ok(last.to_tt().iter().map(|x| x * x).sum::<f64>().sqrt())
    }

    /// Squared Frobenius norm via the inner product with itself.
    pub fn norm_squared(&self) -> Result<f64> {
        self.dot(self)
    }

    /// Frobenius distance `‖self − other‖`.
    pub fn dist(&self, other: &TensorNetwork) -> Result<f64> {
        self.try_sub(other)?.norm()
    }

    /// Index tuples whose entry is nonzero, in lexicographic order.
    ///
    /// Meant for 0/1-valued (mask-like) networks: the enumeration prunes a
    /// branch once the remaining entries sum to (nearly) zero, which is only
    /// sound for nonnegative data. `limit` caps the number of tuples returned.
    pub fn accepted_inputs(&self, limit: Option<usize>) -> Result<Vec<Vec<usize>>> {
        let cores: Vec<_> = self.tt()?.cores.into_iter().map(Core::into_tt).collect();
        let n_axes = cores.len();

        // right[n]: vector summing everything from axis n to the end
        let mut right = vec![Array1::<f64>::ones(cores[n_axes - 1].shape()[2]); n_axes + 1];
        for n in (0..n_axes).rev() {
            let summed = cores[n].sum_axis(Axis(1));
            right[n] = summed.dot(&right[n + 1]);
        }

        let mut found = Vec::new();
        let mut prefix = Vec::with_capacity(n_axes);
        let start = Array1::<f64>::ones(cores[0].shape()[0]);
        let limit = limit.unwrap_or(usize::MAX);
        collect_accepted(&cores, &right, &start, &mut prefix, &mut found, limit);
        Ok(found)
    }
}

fn collect_accepted(
    cores: &[Array3<f64>],
    right: &[Array1<f64>],
    env: &Array1<f64>,
    prefix: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
    limit: usize,
) {
    let n = prefix.len();
    if found.len() >= limit {
        return;
    }
    if n == cores.len() {
        if env.sum().abs() > ACCEPT_THRESHOLD {
            found.push(prefix.clone());
        }
        return;
    }
    for i in 0..cores[n].shape()[1] {
        let next = env.dot(&cores[n].index_axis(Axis(1), i));
        if next.dot(&right[n + 1]).abs() <= ACCEPT_THRESHOLD {
            continue;
        }
        prefix.push(i);
        collect_accepted(cores, right, &next, prefix, found, limit);
        prefix.pop();
        if found.len() >= limit {
            return;
        }
    }
}

/// Relative error `‖gt − approx‖ / ‖gt‖`.
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tnet_network::{relative_error, TensorNetwork};
///
/// let a = TensorNetwork::from_cp_factors(vec![array![[1.0], [2.0]], array![[1.0], [1.0]]]).unwrap();
/// assert!(relative_error(&a, &a).unwrap() < 1e-12);
/// ```
pub fn relative_error(gt: &TensorNetwork, approx: &TensorNetwork) -> Result<f64> {
    Ok(gt.dist(approx)? / gt.norm()?)
}
