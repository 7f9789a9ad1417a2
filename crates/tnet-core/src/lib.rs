//! # tnet-core
//!
//! Dense N-dimensional arrays for the tnet stack.
//!
//! Tensor networks are built from, and reconstructed into, plain dense arrays.
//! This crate provides that buffer type ([`DenseND`]) together with the few
//! operations the network engine needs:
//!
//! - **Creation** from row-major vectors, constants and random samples
//! - **Shape operations** (reshape, permute)
//! - **Matricization** (unfold/fold) used by CP-ALS
//! - **Norms** and element-wise arithmetic for error measurements
//!
//! ## Memory Layout
//!
//! Arrays are C-contiguous (row-major). The last index varies fastest, which is
//! also the order in which a tensor network enumerates its entries.
//!
//! ## Quick Start
//!
//! ```
//! use tnet_core::DenseND;
//!
//! let tensor = DenseND::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4]).unwrap();
//! assert_eq!(tensor.shape(), &[2, 3, 4]);
//! assert_eq!(tensor[&[1, 2, 3]], 23.0);
//!
//! let unfolded = tensor.unfold(1).unwrap();
//! assert_eq!(unfolded.shape(), &[3, 8]);
//! ```

pub mod dense;

pub use dense::DenseND;
