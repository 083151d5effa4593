//! Parameters of the MCAR significance test.

use derive_builder::Builder;

use crate::error::McarError;

/// Significance level below which MCAR is rejected.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Relative singular-value cutoff used by the pseudo-inverse.
pub const DEFAULT_PINV_RCOND: f64 = 1e-15;

/// Tuning knobs of [`McarTest`](crate::mcar::McarTest).
///
/// Defaults: reject MCAR when
/// `p <= 0.05`, skip groups with fewer than two rows or fewer than two
/// observed numeric columns.
///
/// # Examples
///
/// ```
/// use missingness::parameters::McarParametersBuilder;
///
/// let params = McarParametersBuilder::default()
///     .alpha(0.01)
///     .build()
///     .unwrap();
/// assert_eq!(params.alpha(), 0.01);
/// assert_eq!(params.min_group_rows(), 2);
///
/// assert!(McarParametersBuilder::default().alpha(1.5).build().is_err());
/// ```
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[builder(default)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McarParameters {
    /// Significance level, in `(0, 1)`.
    alpha: f64,

    /// Singular values below `rcond * max_singular_value` are treated as zero.
    pinv_rcond: f64,

    /// Pattern groups with fewer rows contribute nothing.
    min_group_rows: usize,

    /// Pattern groups with fewer observed numeric columns contribute nothing.
    min_observed_columns: usize,
}

impl Default for McarParameters {
    fn default() -> Self {
        McarParameters {
            alpha: DEFAULT_ALPHA,
            pinv_rcond: DEFAULT_PINV_RCOND,
            min_group_rows: 2,
            min_observed_columns: 2,
        }
    }
}

impl McarParameters {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn pinv_rcond(&self) -> f64 {
        self.pinv_rcond
    }

    pub fn min_group_rows(&self) -> usize {
        self.min_group_rows
    }

    pub fn min_observed_columns(&self) -> usize {
        self.min_observed_columns
    }
}

impl McarParametersBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(alpha) = self.alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(format!("alpha must be in (0, 1), got {alpha}"));
            }
        }
        if let Some(rcond) = self.pinv_rcond {
            if !rcond.is_finite() || rcond < 0.0 {
                return Err(format!("pinv_rcond must be finite and non-negative, got {rcond}"));
            }
        }
        if let Some(rows) = self.min_group_rows {
            if rows < 2 {
                return Err(format!("min_group_rows must be at least 2, got {rows}"));
            }
        }
        if let Some(columns) = self.min_observed_columns {
            if columns < 2 {
                return Err(format!("min_observed_columns must be at least 2, got {columns}"));
            }
        }
        Ok(())
    }
}

impl From<McarParametersBuilderError> for McarError {
    fn from(e: McarParametersBuilderError) -> Self {
        McarError::InvalidParameters(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = McarParametersBuilder::default().build().unwrap();
        assert_eq!(params, McarParameters::default());
        assert_eq!(params.alpha(), 0.05);
        assert_eq!(params.pinv_rcond(), 1e-15);
        assert_eq!(params.min_observed_columns(), 2);
    }

    #[test]
    fn test_validation() {
        assert!(McarParametersBuilder::default().alpha(0.0).build().is_err());
        assert!(McarParametersBuilder::default().alpha(f64::NAN).build().is_err());
        assert!(McarParametersBuilder::default().pinv_rcond(-1.0).build().is_err());
        assert!(McarParametersBuilder::default().min_group_rows(1).build().is_err());
        assert!(McarParametersBuilder::default()
            .min_observed_columns(1)
            .build()
            .is_err());

        let params = McarParametersBuilder::default()
            .min_group_rows(5)
            .pinv_rcond(1e-10)
            .build()
            .unwrap();
        assert_eq!(params.min_group_rows(), 5);
    }

    #[test]
    fn test_builder_error_converts() {
        let err: McarError = McarParametersBuilder::default()
            .alpha(2.0)
            .build()
            .unwrap_err()
            .into();
        assert!(matches!(err, McarError::InvalidParameters(_)));
    }
}
