//! Error types for tensor network operations

use thiserror::Error;
use tnet_kernels::KernelError;

/// Errors raised by network construction, arithmetic, rounding and indexing.
///
/// Every failing operation leaves its inputs untouched.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Rank mismatch between cores {left} and {right}: {left_rank} != {right_rank}")]
    RankMismatch {
        left: usize,
        right: usize,
        left_rank: usize,
        right_rank: usize,
    },

    #[error("Cannot broadcast shapes {left:?} and {right:?}")]
    Broadcast { left: Vec<usize>, right: Vec<usize> },

    #[error("Invalid index: {0}")]
    Indexing(String),

    #[error("Invalid mask: {0}")]
    Mask(String),

    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Core(#[from] anyhow::Error),
}

/// Result alias for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
