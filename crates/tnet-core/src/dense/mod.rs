//! Dense tensor implementation and operations

pub mod types;

mod creation;
mod shape_ops;
mod statistics;

pub(crate) mod functions;

pub mod densend_traits;

pub use types::DenseND;
