//! # tnet - Hybrid tensor networks for Rust
//!
//! Compressed N-way arrays that mix **tensor-train**, **CP** and **Tucker**
//! formats axis by axis, with arithmetic, rounding and indexing carried out
//! directly on the compressed representation.
//!
//! This is the **meta crate** that re-exports all tnet components for convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use tnet::prelude::*;
//!
//! let data = DenseND::<f64>::ones(&[4, 5, 6]);
//! let t = TensorNetwork::tt_svd(&data, 1e-10)?;
//! assert_eq!(t.ranks_tt(), vec![1, 1, 1, 1]);
//! # Ok::<(), NetworkError>(())
//! ```
//!
//! ## Components
//!
//! ### Dense Arrays ([`core`])
//!
//! The dense buffer networks are built from and reconstructed into.
//!
//! ```
//! use tnet::core::DenseND;
//!
//! let tensor = DenseND::<f64>::ones(&[2, 3, 4]);
//! let reshaped = tensor.reshape(&[6, 4]).unwrap();
//! assert_eq!(reshaped.shape(), &[6, 4]);
//! ```
//!
//! ### Kernels ([`kernels`])
//!
//! Khatri-Rao and Kronecker products, core unfoldings, QR/SVD truncation.
//!
//! ```
//! use tnet::kernels::khatri_rao;
//! use scirs2_core::ndarray_ext::Array2;
//!
//! let a = Array2::<f64>::ones((10, 5));
//! let b = Array2::<f64>::ones((8, 5));
//! let kr = khatri_rao(&a.view(), &b.view());
//! assert_eq!(kr.shape(), &[80, 5]);
//! ```
//!
//! ### Tensor Networks ([`network`])
//!
//! Construction (full rank, TT-SVD, CP-ALS, Tucker), format-aware arithmetic,
//! orthogonalisation and rounding, NumPy-style indexing and mask selection.
//!
//! ```
//! use tnet::core::DenseND;
//! use tnet::network::{DecompositionOptions, Index, TensorNetwork};
//!
//! let data = DenseND::<f64>::random_uniform(&[6, 7, 8], 0.0, 1.0);
//! let opts = DecompositionOptions::default().with_ranks_tucker(3);
//! let t = TensorNetwork::decompose(&data, &opts).unwrap();
//! assert_eq!(t.ranks_tucker(), vec![3, 3, 3]);
//!
//! let slab = t.get(&[Index::full(), Index::Int(2), Index::full()]).unwrap();
//! assert_eq!(slab.into_network().unwrap().shape(), vec![6, 8]);
//! ```

pub use tnet_core as core;
pub use tnet_kernels as kernels;
pub use tnet_network as network;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use tnet::prelude::*;
    //!
    //! let t = TensorNetwork::constant(&[3, 4], 2.0).unwrap();
    //! assert!((t.sum() - 24.0).abs() < 1e-12);
    //! ```

    // Dense arrays
    pub use crate::core::DenseND;

    // Networks and their building blocks
    pub use crate::network::{Core, NetworkFormat, TensorNetwork};

    // Construction and rounding options
    pub use crate::network::{
        cp_als, CpAlsOptions, DecompositionOptions, Ranks, RoundingOptions, TruncationAlgorithm,
    };

    // Indexing
    pub use crate::network::{Index, Indexed, SliceSpec};

    // Metrics and errors
    pub use crate::network::{relative_error, NetworkError, Result};
}
