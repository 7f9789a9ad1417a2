//! Format-aware arithmetic
//!
//! Sums and products are computed core by core without reconstructing the
//! dense arrays:
//!
//! - **Addition** stacks the two cores block-diagonally, so ranks add up.
//!   Axes where both operands are CP stay CP (their matrices are concatenated
//!   column-wise); every other axis becomes TT.
//! - **Multiplication** (element-wise) takes slice-wise Kronecker products, so
//!   ranks multiply. CP times CP stays CP.
//!
//! When both operands carry Tucker factors on an axis, addition keeps them
//! (block-diagonal core, concatenated factors) and multiplication keeps them
//! if the product of the Tucker ranks stays below the axis size.
//!
//! Operands of different sizes are broadcast when one size divides the other.
//! The `std::ops` operators panic on shape errors, like the element-wise
//! operators of `DenseND`; use the `try_*` methods to handle them.

use crate::core::Core;
use crate::error::{NetworkError, Result};
use crate::network::TensorNetwork;
use log::debug;
use scirs2_core::ndarray_ext::{s, Array2, Array3, Axis};
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Sub};
use tnet_kernels::khatri_rao::face_splitting;
use tnet_kernels::{core_kron, core_outer};

/// Largest `‖a − b‖` for which two networks compare equal.
pub const APPROX_EQ_TOLERANCE: f64 = 1e-14;

/// Bring two networks to a common shape by repeating the smaller axes.
///
/// # Errors
///
/// Returns `Broadcast` if the dimensionalities differ or an axis pair has
/// sizes that do not divide each other.
pub fn broadcast(a: &TensorNetwork, b: &TensorNetwork) -> Result<(TensorNetwork, TensorNetwork)> {
    let (sa, sb) = (a.shape(), b.shape());
    let incompatible = || NetworkError::Broadcast {
        left: sa.clone(),
        right: sb.clone(),
    };
    if sa.len() != sb.len() {
        return Err(incompatible());
    }

    let mut reps_a = vec![1; sa.len()];
    let mut reps_b = vec![1; sb.len()];
    for (n, (&x, &y)) in sa.iter().zip(sb.iter()).enumerate() {
        if x == y {
            continue;
        }
        if x < y && y % x == 0 {
            reps_a[n] = y / x;
        } else if y < x && x % y == 0 {
            reps_b[n] = x / y;
        } else {
            return Err(incompatible());
        }
    }

    let a = if reps_a.iter().any(|&r| r != 1) {
        debug!("broadcast: repeating left operand {:?} by {:?}", sa, reps_a);
        a.repeat(&reps_a)?
    } else {
        a.clone()
    };
    let b = if reps_b.iter().any(|&r| r != 1) {
        debug!("broadcast: repeating right operand {:?} by {:?}", sb, reps_b);
        b.repeat(&reps_b)?
    } else {
        b.clone()
    };
    Ok((a, b))
}

/// Core as a 3-D array for combination: CP axes that stay CP use the
/// single-row form `(1, S, R)`, everything else the TT form.
fn combination_core(core: &Core, keep_cp: bool) -> Array3<f64> {
    match core {
        Core::Cp(a) if keep_cp => a.clone().insert_axis(Axis(0)),
        other => other.to_tt(),
    }
}

fn block_diagonal_bonds(ga: &Array3<f64>, gb: &Array3<f64>) -> Array3<f64> {
    let (ra, n, rb) = ga.dim();
    let (rc, _, rd) = gb.dim();
    let mut out = Array3::zeros((ra + rc, n, rb + rd));
    out.slice_mut(s![..ra, .., ..rb]).assign(ga);
    out.slice_mut(s![ra.., .., rb..]).assign(gb);
    out
}

fn block_diagonal_all(ga: &Array3<f64>, gb: &Array3<f64>) -> Array3<f64> {
    let (ra, sa, rb) = ga.dim();
    let (rc, sb, rd) = gb.dim();
    let mut out = Array3::zeros((ra + rc, sa + sb, rb + rd));
    out.slice_mut(s![..ra, ..sa, ..rb]).assign(ga);
    out.slice_mut(s![ra.., sa.., rb..]).assign(gb);
    out
}

fn hstack(ua: &Array2<f64>, ub: &Array2<f64>) -> Array2<f64> {
    let (rows, ca) = ua.dim();
    let mut out = Array2::zeros((rows, ca + ub.ncols()));
    out.slice_mut(s![.., ..ca]).assign(ua);
    out.slice_mut(s![.., ca..]).assign(ub);
    out
}

/// Core with its Tucker factor (if any) contracted into the middle index.
fn decompressed(core: &Core, factor: &Option<Array2<f64>>) -> Result<Core> {
    match factor {
        Some(u) => Ok(core.mode_product(u)?),
        None => Ok(core.clone()),
    }
}

impl TensorNetwork {
    /// Element-wise sum.
    ///
    /// # Errors
    ///
    /// Returns `Broadcast` if the shapes cannot be broadcast together.
    ///
    /// # Examples
    ///
    /// ```
    /// use scirs2_core::ndarray_ext::array;
    /// use tnet_network::TensorNetwork;
    ///
    /// let a = TensorNetwork::from_cp_factors(vec![array![[1.0], [2.0]], array![[1.0], [1.0]]]).unwrap();
    /// let sum = a.try_add(&a).unwrap();
    /// assert_eq!(sum.ranks_tt(), vec![2, 2, 2]);
    /// assert_eq!(sum.format().to_string(), "CP");
    /// ```
    pub fn try_add(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        let (a, b) = broadcast(self, other)?;
        let n_axes = a.ndim();
        let mut cores = Vec::with_capacity(n_axes);
        let mut factors = Vec::with_capacity(n_axes);

        for mu in 0..n_axes {
            let both_cp = a.cores[mu].is_cp() && b.cores[mu].is_cp();
            let (core, factor) = match (&a.factors[mu], &b.factors[mu]) {
                (Some(ua), Some(ub)) => {
                    let ga = combination_core(&a.cores[mu], both_cp);
                    let gb = combination_core(&b.cores[mu], both_cp);
                    (block_diagonal_all(&ga, &gb), Some(hstack(ua, ub)))
                }
                (fa, fb) => {
                    let ga = combination_core(&decompressed(&a.cores[mu], fa)?, both_cp);
                    let gb = combination_core(&decompressed(&b.cores[mu], fb)?, both_cp);
                    (block_diagonal_bonds(&ga, &gb), None)
                }
            };

            let core = if both_cp {
                Core::Cp(core.sum_axis(Axis(0)))
            } else {
                let mut g = core;
                if mu == 0 {
                    g = g.sum_axis(Axis(0)).insert_axis(Axis(0));
                }
                if mu == n_axes - 1 {
                    g = g.sum_axis(Axis(2)).insert_axis(Axis(2));
                }
                Core::Tt(g)
            };
            cores.push(core);
            factors.push(factor);
        }

        TensorNetwork::from_parts(cores, factors, Some(a.labels.clone()))
    }

    /// Element-wise difference.
    pub fn try_sub(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        self.try_add(&other.scale(-1.0))
    }

    /// Element-wise (Hadamard) product.
    ///
    /// # Errors
    ///
    /// Returns `Broadcast` if the shapes cannot be broadcast together.
    pub fn try_mul(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        let (a, b) = broadcast(self, other)?;
        let n_axes = a.ndim();
        let shape = a.shape();
        let mut cores = Vec::with_capacity(n_axes);
        let mut factors = Vec::with_capacity(n_axes);

        for mu in 0..n_axes {
            let both_cp = a.cores[mu].is_cp() && b.cores[mu].is_cp();
            let keep_factors = match (&a.factors[mu], &b.factors[mu]) {
                (Some(ua), Some(ub)) => ua.ncols() * ub.ncols() < shape[mu],
                _ => false,
            };

            let (core, factor) = match (&a.factors[mu], &b.factors[mu]) {
                (Some(ua), Some(ub)) if keep_factors => {
                    let ga = combination_core(&a.cores[mu], both_cp);
                    let gb = combination_core(&b.cores[mu], both_cp);
                    (core_outer(&ga, &gb), Some(face_splitting(&ua.view(), &ub.view())))
                }
                (fa, fb) => {
                    let ga = combination_core(&decompressed(&a.cores[mu], fa)?, both_cp);
                    let gb = combination_core(&decompressed(&b.cores[mu], fb)?, both_cp);
                    (core_kron(&ga, &gb)?, None)
                }
            };

            let core = if both_cp {
                Core::Cp(core.index_axis(Axis(0), 0).to_owned())
            } else {
                Core::Tt(core)
            };
            cores.push(core);
            factors.push(factor);
        }

        TensorNetwork::from_parts(cores, factors, Some(a.labels.clone()))
    }

    /// Multiply every entry by `factor` (only the first core changes).
    pub fn scale(&self, factor: f64) -> TensorNetwork {
        let mut t = self.clone();
        t.cores[0].scale(factor);
        t
    }

    /// Add `value` to every entry.
    pub fn add_scalar(&self, value: f64) -> Result<TensorNetwork> {
        let constant = TensorNetwork::constant(&self.shape(), value)?;
        self.try_add(&constant)
    }

    /// Rank-one TT network with every entry equal to `value`.
    pub fn constant(shape: &[usize], value: f64) -> Result<TensorNetwork> {
        let cores = shape
            .iter()
            .enumerate()
            .map(|(n, &size)| {
                let fill = if n == 0 { value } else { 1.0 };
                Array3::from_elem((1, size, 1), fill)
            })
            .collect();
        TensorNetwork::from_tt_cores(cores)
    }

    /// `1 − x`: logical negation of a 0/1 mask.
    pub fn complement(&self) -> Result<TensorNetwork> {
        self.scale(-1.0).add_scalar(1.0)
    }

    /// `a · b`: logical AND of two masks.
    pub fn and(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        self.try_mul(other)
    }

    /// `a + b − a·b`: logical OR of two masks.
    pub fn or(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        self.try_add(other)?.try_sub(&self.try_mul(other)?)
    }

    /// `a + b − 2·a·b`: logical XOR of two masks.
    pub fn xor(&self, other: &TensorNetwork) -> Result<TensorNetwork> {
        self.try_add(other)?.try_sub(&self.try_mul(other)?.scale(2.0))
    }

    /// `‖self − other‖ ≤ 1e-14`.
    pub fn approx_eq(&self, other: &TensorNetwork) -> Result<bool> {
        Ok(self.dist(other)? <= APPROX_EQ_TOLERANCE)
    }
}

impl Add for &TensorNetwork {
    type Output = TensorNetwork;

    fn add(self, other: &TensorNetwork) -> TensorNetwork {
        self.try_add(other).expect("Shapes must be broadcastable for addition")
    }
}

impl Sub for &TensorNetwork {
    type Output = TensorNetwork;

    fn sub(self, other: &TensorNetwork) -> TensorNetwork {
        self.try_sub(other).expect("Shapes must be broadcastable for subtraction")
    }
}

impl Mul for &TensorNetwork {
    type Output = TensorNetwork;

    fn mul(self, other: &TensorNetwork) -> TensorNetwork {
        self.try_mul(other).expect("Shapes must be broadcastable for multiplication")
    }
}

impl Neg for &TensorNetwork {
    type Output = TensorNetwork;

    fn neg(self) -> TensorNetwork {
        self.scale(-1.0)
    }
}

impl Mul<f64> for &TensorNetwork {
    type Output = TensorNetwork;

    fn mul(self, factor: f64) -> TensorNetwork {
        self.scale(factor)
    }
}

impl Mul<&TensorNetwork> for f64 {
    type Output = TensorNetwork;

    fn mul(self, t: &TensorNetwork) -> TensorNetwork {
        t.scale(self)
    }
}

impl Div<f64> for &TensorNetwork {
    type Output = TensorNetwork;

    fn div(self, divisor: f64) -> TensorNetwork {
        self.scale(1.0 / divisor)
    }
}

impl Add<f64> for &TensorNetwork {
    type Output = TensorNetwork;

    fn add(self, value: f64) -> TensorNetwork {
        self.add_scalar(value).expect("Scalar addition cannot change the shape")
    }
}

impl Add<&TensorNetwork> for f64 {
    type Output = TensorNetwork;

    fn add(self, t: &TensorNetwork) -> TensorNetwork {
        t + self
    }
}

impl Sub<f64> for &TensorNetwork {
    type Output = TensorNetwork;

    fn sub(self, value: f64) -> TensorNetwork {
        self + (-value)
    }
}

impl Sub<&TensorNetwork> for f64 {
    type Output = TensorNetwork;

    fn sub(self, t: &TensorNetwork) -> TensorNetwork {
        &(-t) + self
    }
}

impl Not for &TensorNetwork {
    type Output = TensorNetwork;

    fn not(self) -> TensorNetwork {
        self.complement().expect("Scalar addition cannot change the shape")
    }
}

impl BitAnd for &TensorNetwork {
    type Output = TensorNetwork;

    fn bitand(self, other: &TensorNetwork) -> TensorNetwork {
        self.and(other).expect("Shapes must be broadcastable for AND")
    }
}

impl BitOr for &TensorNetwork {
    type Output = TensorNetwork;

    fn bitor(self, other: &TensorNetwork) -> TensorNetwork {
        self.or(other).expect("Shapes must be broadcastable for OR")
    }
}

impl BitXor for &TensorNetwork {
    type Output = TensorNetwork;

    fn bitxor(self, other: &TensorNetwork) -> TensorNetwork {
        self.xor(other).expect("Shapes must be broadcastable for XOR")
    }
}

impl PartialEq for TensorNetwork {
    fn eq(&self, other: &TensorNetwork) -> bool {
        self.approx_eq(other).unwrap_or(false)
    }
}
