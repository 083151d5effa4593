use log::info;

use crate::dataset::Dataset;
use crate::error::ImputationResult;
use crate::parameters::preprocessing::ImputationStrategy;

use super::ColumnImputer;

/// Applies a strategy to each named column, in order.
///
/// Steps run one after another on a working copy of the dataset, so a
/// nearest-neighbor step sees the values filled by earlier steps. The input
/// dataset is never modified.
///
/// # Examples
///
/// ```
/// use missingness::dataset::{Column, Dataset};
/// use missingness::parameters::{CategoricalStrategy, NumericStrategy};
/// use missingness::preprocessing::plan::ImputationPlan;
///
/// let dataset = Dataset::from_columns(vec![
///     ("price", Column::numeric(vec![3.0, f64::NAN, 5.0])),
///     ("color", Column::categorical(vec![Some("red"), None, Some("red")])),
/// ])
/// .unwrap();
///
/// let plan = ImputationPlan::new()
///     .with("price", NumericStrategy::Median)
///     .with("color", CategoricalStrategy::NewCategory);
///
/// let filled = plan.apply(&dataset).unwrap();
/// assert_eq!(filled.column("price").unwrap().missing_count(), 0);
/// assert_eq!(filled.column("color").unwrap().missing_count(), 0);
/// assert_eq!(dataset.column("price").unwrap().missing_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImputationPlan {
    steps: Vec<(String, ImputationStrategy)>,
}

impl ImputationPlan {
    pub fn new() -> Self {
        ImputationPlan::default()
    }

    /// Appends a step and returns the plan.
    pub fn with<S, T>(mut self, column: S, strategy: T) -> Self
    where
        S: Into<String>,
        T: Into<ImputationStrategy>,
    {
        self.push(column, strategy);
        self
    }

    pub fn push<S, T>(&mut self, column: S, strategy: T)
    where
        S: Into<String>,
        T: Into<ImputationStrategy>,
    {
        self.steps.push((column.into(), strategy.into()));
    }

    pub fn steps(&self) -> &[(String, ImputationStrategy)] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step and returns the filled dataset.
    ///
    /// # Errors
    ///
    /// Fails on the first step whose column is unknown, of the wrong kind, or
    /// has nothing to impute from.
    pub fn apply(&self, dataset: &Dataset) -> ImputationResult<Dataset> {
        let mut working = dataset.clone();
        for (column, strategy) in &self.steps {
            let filled = strategy.impute(&working, column)?;
            working.replace_column(column, filled)?;
        }
        info!(
            "Applied {} imputation steps to dataset with shape: {}x{}",
            self.steps.len(),
            working.row_count(),
            working.column_count()
        );
        Ok(working)
    }
}
