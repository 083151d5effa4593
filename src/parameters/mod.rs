//! Parameters for the MCAR test and the imputation strategies.
//!
//! Strategies are closed enums, one per column kind, so an unknown strategy
//! cannot be requested. MCAR test parameters are built through
//! [`McarParametersBuilder`](mcar::McarParametersBuilder), which validates
//! ranges when `build` is called.

pub mod mcar;
pub mod preprocessing;

pub use self::mcar::{McarParameters, McarParametersBuilder};
pub use self::preprocessing::{CategoricalStrategy, ImputationStrategy, NumericStrategy};
