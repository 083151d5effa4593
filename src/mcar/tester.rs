//! The MCAR significance test.
//!
//! Every pattern group with at least two rows and two observed numeric
//! columns contributes the sum of its rows' squared Mahalanobis distances,
//! measured against the group's own mean and (maximum-likelihood)
//! covariance, to a chi-squared statistic. Degrees of freedom grow by
//! `rows * columns` per contributing group.
//!
//! This approximates Little's test. It does not pool a global mean and does
//! not apply Little's finite-sample correction.

use std::fmt;

use log::{debug, info};
use nalgebra::DMatrix;
use ndarray::{Array2, Axis};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::dataset::Dataset;
use crate::error::{McarError, McarResult};
use crate::parameters::McarParameters;
use crate::types::{Array2D, ArrayView2D};

use super::pattern::{MissingnessMatrix, PatternGroup};

const SVD_MAX_ITERATIONS: usize = 10_000;

/// Why a pattern group contributed nothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    TooFewRows { rows: usize },
    TooFewObservedColumns { columns: usize },
    NumericFailure(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewRows { rows } => write!(f, "too few rows ({rows})"),
            SkipReason::TooFewObservedColumns { columns } => {
                write!(f, "too few observed numeric columns ({columns})")
            }
            SkipReason::NumericFailure(msg) => write!(f, "numeric failure: {msg}"),
        }
    }
}

/// What one pattern group adds to the test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupContribution {
    pub rows: usize,
    pub columns: usize,
    /// Sum of the rows' squared Mahalanobis distances.
    pub statistic: f64,
}

impl GroupContribution {
    pub fn degrees_of_freedom(&self) -> usize {
        self.rows * self.columns
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupOutcome {
    Contributed(GroupContribution),
    Skipped(SkipReason),
}

/// Scores one pattern group.
///
/// Groups that cannot be scored come back as [`GroupOutcome::Skipped`]
/// instead of failing the whole test.
pub fn evaluate_group(group: &PatternGroup, params: &McarParameters) -> GroupOutcome {
    let rows = group.row_count();
    if rows < params.min_group_rows() {
        return GroupOutcome::Skipped(SkipReason::TooFewRows { rows });
    }

    let columns = group.numeric_column_count();
    if columns < params.min_observed_columns() {
        return GroupOutcome::Skipped(SkipReason::TooFewObservedColumns { columns });
    }

    match mahalanobis_sum(&group.observed_numeric.view(), params.pinv_rcond()) {
        Ok(statistic) => GroupOutcome::Contributed(GroupContribution {
            rows,
            columns,
            statistic,
        }),
        Err(msg) => GroupOutcome::Skipped(SkipReason::NumericFailure(msg)),
    }
}

/// Sum over rows of `(x - mean) * pinv(cov) * (x - mean)^T`, with the
/// population covariance of `x`.
pub fn mahalanobis_sum(x: &ArrayView2D, rcond: f64) -> Result<f64, String> {
    let n = x.nrows() as f64;
    let mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| "cannot average an empty group".to_string())?;
    let centered = x - &mean;
    let covariance = centered.t().dot(&centered) / n;
    let inverse = pseudo_inverse(&covariance, rcond)?;

    let projected = centered.dot(&inverse);
    let statistic = (&projected * &centered).sum();
    if !statistic.is_finite() {
        return Err(format!("non-finite statistic {statistic}"));
    }
    Ok(statistic)
}

/// Moore-Penrose pseudo-inverse through the SVD.
///
/// Singular values at or below `rcond * max_singular_value` are dropped, so
/// singular matrices invert without error.
pub fn pseudo_inverse(matrix: &Array2D, rcond: f64) -> Result<Array2D, String> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err("matrix has non-finite entries".to_string());
    }

    let (rows, cols) = matrix.dim();
    let m = DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]);
    let svd = m
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| "SVD did not converge".to_string())?;
    let max_singular = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let pinv = svd
        .pseudo_inverse(max_singular * rcond)
        .map_err(|e| e.to_string())?;

    Ok(Array2::from_shape_fn(pinv.shape(), |(i, j)| pinv[(i, j)]))
}

/// Right-tail probability of `statistic` under a chi-squared distribution
/// with `degrees_of_freedom` degrees of freedom.
pub fn p_value(statistic: f64, degrees_of_freedom: usize) -> McarResult<f64> {
    if statistic.is_nan() {
        return Err(McarError::InvalidInput("test statistic is NaN".to_string()));
    }
    let distribution = ChiSquared::new(degrees_of_freedom as f64)
        .map_err(|e| McarError::InvalidInput(e.to_string()))?;
    Ok(distribution.sf(statistic.max(0.0)))
}

/// Outcome of an MCAR test run with its intermediate values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McarReport {
    pub test_statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// `true` when `p_value > alpha`, i.e. MCAR is not rejected.
    pub is_mcar: bool,
    pub groups_total: usize,
    pub groups_contributing: usize,
    pub groups_skipped: usize,
}

impl McarReport {
    #[cfg(feature = "use_serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Running totals over group outcomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestAccumulator {
    statistic: f64,
    degrees_of_freedom: usize,
    contributing_groups: usize,
    skipped_groups: usize,
}

impl TestAccumulator {
    pub fn new() -> Self {
        TestAccumulator::default()
    }

    pub fn add(&mut self, outcome: &GroupOutcome) {
        match outcome {
            GroupOutcome::Contributed(contribution) => {
                self.statistic += contribution.statistic;
                self.degrees_of_freedom += contribution.degrees_of_freedom();
                self.contributing_groups += 1;
            }
            GroupOutcome::Skipped(_) => self.skipped_groups += 1,
        }
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    pub fn contributing_groups(&self) -> usize {
        self.contributing_groups
    }

    pub fn skipped_groups(&self) -> usize {
        self.skipped_groups
    }

    /// Turns the totals into a report.
    ///
    /// # Errors
    ///
    /// * `McarError::InsufficientData` - if no group contributed
    pub fn finalize(self, alpha: f64) -> McarResult<McarReport> {
        let groups_total = self.contributing_groups + self.skipped_groups;
        if self.degrees_of_freedom == 0 {
            return Err(McarError::InsufficientData {
                groups: groups_total,
                skipped: self.skipped_groups,
            });
        }

        let p_value = p_value(self.statistic, self.degrees_of_freedom)?;
        Ok(McarReport {
            test_statistic: self.statistic,
            degrees_of_freedom: self.degrees_of_freedom,
            p_value,
            is_mcar: p_value > alpha,
            groups_total,
            groups_contributing: self.contributing_groups,
            groups_skipped: self.skipped_groups,
        })
    }
}

/// Approximate Little's MCAR test.
///
/// # Examples
///
/// ```
/// use missingness::dataset::{Column, Dataset};
/// use missingness::mcar::McarTest;
///
/// let nan = f64::NAN;
/// let dataset = Dataset::from_columns(vec![
///     ("a", Column::numeric(vec![1.0, 2.0, 3.5, 4.0, nan, 6.0, 7.0, 8.0])),
///     ("b", Column::numeric(vec![2.0, 1.0, 4.0, 3.0, 5.0, nan, 8.0, 6.5])),
/// ])
/// .unwrap();
///
/// let report = McarTest::default().run(&dataset).unwrap();
/// assert_eq!(report.degrees_of_freedom, 12);
/// assert!(report.is_mcar);
/// ```
#[derive(Debug, Clone, Default)]
pub struct McarTest {
    params: McarParameters,
}

impl McarTest {
    pub fn new(params: McarParameters) -> Self {
        McarTest { params }
    }

    pub fn parameters(&self) -> &McarParameters {
        &self.params
    }

    /// Runs the test and returns the statistic, degrees of freedom, p-value and verdict.
    ///
    /// # Errors
    ///
    /// * `McarError::InvalidInput` - if the dataset has no rows
    /// * `McarError::InsufficientColumns` - if fewer than two columns are partially missing
    /// * `McarError::InsufficientData` - if every pattern group was skipped
    pub fn run(&self, dataset: &Dataset) -> McarResult<McarReport> {
        let matrix = MissingnessMatrix::from_dataset(dataset)?;

        let mut accumulator = TestAccumulator::new();
        for group in matrix.groups() {
            let outcome = evaluate_group(&group, &self.params);
            if let GroupOutcome::Skipped(reason) = &outcome {
                debug!(
                    "Skipping pattern group {:?} ({} rows): {}",
                    group.pattern.to_flags(),
                    group.row_count(),
                    reason
                );
            }
            accumulator.add(&outcome);
        }

        let report = accumulator.finalize(self.params.alpha())?;
        info!(
            "MCAR test: statistic={:.4}, dof={}, p={:.4}, mcar={} ({} of {} groups skipped)",
            report.test_statistic,
            report.degrees_of_freedom,
            report.p_value,
            report.is_mcar,
            report.groups_skipped,
            report.groups_total
        );
        Ok(report)
    }

    /// Returns only the verdict of [`McarTest::run`].
    pub fn is_mcar(&self, dataset: &Dataset) -> McarResult<bool> {
        self.run(dataset).map(|report| report.is_mcar)
    }
}

/// Runs the MCAR test with default parameters and returns the verdict.
pub fn is_mcar(dataset: &Dataset) -> McarResult<bool> {
    McarTest::default().is_mcar(dataset)
}
