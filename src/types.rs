//! Array aliases used across the crate.
//!
//! `ndarray` is re-exported so callers build columns and read sub-tables
//! against the same version this crate links.

pub use ndarray;

/// 1-dimensional array of f64 values
pub type Array1D = ndarray::Array1<f64>;

/// 2-dimensional array of f64 values
pub type Array2D = ndarray::Array2<f64>;

/// 2-dimensional array view of f64 values
pub type ArrayView2D<'a> = ndarray::ArrayView2<'a, f64>;
