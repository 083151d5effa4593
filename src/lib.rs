//! Missing-data diagnostics for tabular datasets.
//!
//! Helps decide between complete-case analysis (dropping incomplete rows)
//! and imputation:
//!
//! - [`mcar`] runs an approximate Little's MCAR test: rows are grouped by
//!   missingness pattern, each group's squared Mahalanobis distances are
//!   pooled into a chi-squared statistic, and MCAR is rejected when the
//!   p-value is at or below the significance level.
//! - [`preprocessing`] fills missing values column by column
//!   (mean, median, mode, new category, random, nearest neighbors) and
//!   summarizes what complete-case analysis would cost.
//!
//! # Examples
//!
//! ```
//! use missingness::dataset::{Column, Dataset};
//! use missingness::mcar::McarTest;
//! use missingness::preprocessing::cca::data_loss_percentage;
//!
//! let nan = f64::NAN;
//! let dataset = Dataset::from_columns(vec![
//!     ("height", Column::numeric(vec![1.62, 1.80, nan, 1.75, 1.68, 1.91, 1.55, nan])),
//!     ("weight", Column::numeric(vec![58.0, nan, 71.0, 80.0, 62.0, 95.0, 49.0, 77.0])),
//! ])
//! .unwrap();
//!
//! assert_eq!(data_loss_percentage(&dataset), 37.5);
//!
//! let report = McarTest::default().run(&dataset).unwrap();
//! assert_eq!(report.degrees_of_freedom, 10);
//! ```

pub mod dataset;
pub mod error;
pub mod mcar;
pub mod parameters;
pub mod preprocessing;
pub mod types;

pub use crate::dataset::{Column, ColumnKind, Dataset};
pub use crate::error::{DatasetError, ImputationError, McarError};
pub use crate::mcar::{is_mcar, McarReport, McarTest};
