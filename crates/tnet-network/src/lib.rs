//! # tnet-network - Hybrid TT / CP / Tucker tensor networks
//!
//! A [`TensorNetwork`] stores an N-way array as a chain of small per-axis
//! cores and works on it without ever materialising the full array.
//!
//! ## Formats
//!
//! Every axis independently uses one of:
//!
//! - **TT**: a 3-way core `(r_left, n, r_right)` linked to its neighbours by bond ranks
//! - **CP**: an `(n, R)` factor matrix sharing one global rank `R`
//!
//! and may additionally carry a **Tucker** factor `U (I, n)` that expands the
//! core's middle index to the physical size `I`:
//!
//! ```text
//! X(i₁,...,iₙ) = 1ᵀ · G₁[i₁] · G₂[i₂] ⋯ Gₙ[iₙ] · 1
//! ```
//!
//! Arithmetic is format-aware: CP + CP stays CP, anything mixed becomes TT.
//!
//! ## Operations
//!
//! - **Construction** ([`construction`]): full-rank reshaping, TT-SVD, CP-ALS
//! - **Arithmetic** ([`arithmetic`]): `+ − ×` between networks, scalar ops,
//!   boolean mask algebra, broadcasting
//! - **Rounding** ([`rounding`]): orthogonalisation, TT and Tucker truncation
//!   under relative error budgets
//! - **Indexing** ([`indexing`]): integers, slices, index arrays, new axes,
//!   ellipsis, mask selection and region assignment
//! - **Metrics** ([`metrics`]): sums, dot products, norms, relative error
//!
//! ## Quick Start
//!
//! ```
//! use tnet_core::DenseND;
//! use tnet_network::{relative_error, Index, TensorNetwork};
//!
//! // A smooth 3-way array compresses well
//! let values: Vec<f64> = (0..60)
//!     .map(|k| 1.0 / (1.0 + (k / 20) as f64 + ((k / 5) % 4) as f64 + (k % 5) as f64))
//!     .collect();
//! let data = DenseND::from_vec(values, &[3, 4, 5]).unwrap();
//!
//! let t = TensorNetwork::tt_svd(&data, 1e-8).unwrap();
//! let exact = TensorNetwork::full_rank(&data).unwrap();
//! assert!(relative_error(&exact, &t).unwrap() < 1e-7);
//!
//! // Arithmetic and indexing stay compressed
//! let doubled = &t + &t;
//! let row = doubled.get(&[Index::Int(1), Index::full(), Index::Int(2)]).unwrap();
//! assert_eq!(row.into_network().unwrap().shape(), vec![4]);
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through the `log` facade: rank changes and construction
//! choices at `debug`, CP-ALS progress at `info` when requested, CP-ALS
//! non-convergence at `warn`. No logger is installed by this crate.

pub mod arithmetic;
pub mod construction;
pub mod core;
pub mod error;
pub mod indexing;
pub mod metrics;
pub mod network;
pub mod rounding;


pub use arithmetic::broadcast;
pub use construction::{cp_als, full_rank_cores, CpAlsOptions, DecompositionOptions};
pub use crate::core::Core;
pub use error::{NetworkError, Result};
pub use indexing::{Index, Indexed, SliceSpec};
pub use metrics::relative_error;
pub use network::{NetworkFormat, TensorNetwork};
pub use rounding::{Ranks, RoundingOptions};
pub use tnet_kernels::TruncationAlgorithm;
