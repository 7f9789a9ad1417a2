//! # tnet-kernels
//!
//! Linear-algebra adapter and single-core contraction kernels for tnet.
//!
//! Everything here works on plain `scirs2_core` arrays. Network-level logic
//! (which core to orthogonalise, how ranks propagate) lives in `tnet-network`.
//!
//! **Modules:**
//! - [`linalg`] - thin QR / RQ, truncated SVD (SVD or Gram-matrix based),
//!   least squares, dominant eigenvectors; backed by `scirs2-linalg`
//! - [`tt_ops`] - unfoldings, mode products, bond absorption, single-core
//!   orthogonalisation, CP-to-TT promotion, inner products of core chains
//! - [`khatri_rao`] - column-wise and row-wise Kronecker products of matrices
//! - [`kronecker`] - slice-wise Kronecker and outer products of cores
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{Array2, Array3};
//! use tnet_kernels::linalg::{truncated_svd, SvdBudget, TruncationAlgorithm};
//! use tnet_kernels::{core_kron, khatri_rao};
//!
//! let a = Array2::<f64>::ones((10, 5));
//! let b = Array2::<f64>::ones((8, 5));
//! assert_eq!(khatri_rao(&a.view(), &b.view()).shape(), &[80, 5]);
//!
//! let g = Array3::<f64>::ones((2, 4, 3));
//! assert_eq!(core_kron(&g, &g).unwrap().dim(), (4, 4, 9));
//!
//! // A matrix of ones has rank one
//! let m = Array2::<f64>::ones((6, 4));
//! let (left, right) =
//!     truncated_svd(&m.view(), SvdBudget::Relative(1e-12), None, true, TruncationAlgorithm::Svd)
//!         .unwrap();
//! assert_eq!(left.ncols(), 1);
//! assert_eq!(right.dim(), (1, 4));
//! ```

pub mod error;
pub mod khatri_rao;
pub mod kronecker;
pub mod linalg;
pub mod tt_ops;

#[cfg(test)]
mod property_tests;

pub use error::{KernelError, KernelResult};
pub use khatri_rao::{face_splitting, khatri_rao};
pub use kronecker::{core_kron, core_outer};
pub use linalg::{SvdBudget, TruncationAlgorithm};
