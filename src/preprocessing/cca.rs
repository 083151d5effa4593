//! Complete-case analysis and missingness summaries.
//!
//! These help judge how much data dropping incomplete rows would cost
//! before deciding between CCA and imputation.

use indexmap::IndexMap;
use log::info;

use crate::dataset::Dataset;

use super::round2;

/// Keeps only the rows with no missing cell.
pub fn complete_case_analysis(dataset: &Dataset) -> Dataset {
    let rows: Vec<usize> = (0..dataset.row_count())
        .filter(|&row| !dataset.row_has_missing(row))
        .collect();
    info!(
        "Complete-case analysis kept {} of {} rows",
        rows.len(),
        dataset.row_count()
    );
    dataset.select_rows(&rows)
}

/// Percentage of rows that [`complete_case_analysis`] would drop, rounded to
/// two decimals. An empty dataset loses nothing.
pub fn data_loss_percentage(dataset: &Dataset) -> f64 {
    let total = dataset.row_count();
    if total == 0 {
        return 0.0;
    }
    let incomplete = (0..total).filter(|&row| dataset.row_has_missing(row)).count();
    round2(incomplete as f64 / total as f64 * 100.0)
}

/// Percentage of missing cells per column, rounded to two decimals.
pub fn missing_percentage_per_column(dataset: &Dataset) -> IndexMap<String, f64> {
    let total = dataset.row_count();
    dataset
        .columns()
        .map(|(name, column)| {
            let pct = if total == 0 {
                0.0
            } else {
                round2(column.missing_count() as f64 / total as f64 * 100.0)
            };
            (name.to_string(), pct)
        })
        .collect()
}

/// Counts of missing cells by column and overall.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissingnessSummary {
    pub missing_by_column: IndexMap<String, usize>,
    pub total_missing: usize,
    pub total_cells: usize,
    /// Missing cells over all cells, in percent, rounded to two decimals.
    pub missing_percentage: f64,
    pub incomplete_rows: usize,
    /// Rows dropped by complete-case analysis, in percent.
    pub data_loss_percentage: f64,
}

impl MissingnessSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let missing_by_column: IndexMap<String, usize> = dataset
            .columns()
            .map(|(name, column)| (name.to_string(), column.missing_count()))
            .collect();
        let total_missing: usize = missing_by_column.values().sum();
        let total_cells = dataset.row_count() * dataset.column_count();
        let missing_percentage = if total_cells == 0 {
            0.0
        } else {
            round2(total_missing as f64 / total_cells as f64 * 100.0)
        };
        let incomplete_rows = (0..dataset.row_count())
            .filter(|&row| dataset.row_has_missing(row))
            .count();

        MissingnessSummary {
            missing_by_column,
            total_missing,
            total_cells,
            missing_percentage,
            incomplete_rows,
            data_loss_percentage: data_loss_percentage(dataset),
        }
    }

    /// Columns with at least one missing cell, in dataset order.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &str> {
        self.missing_by_column
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, _)| name.as_str())
    }
}
