use crate::dataset::{Column, ColumnKind, Dataset};
use crate::error::{ImputationError, ImputationResult};
use crate::types::Array1D;

pub mod cca;
pub mod imputer;
pub mod plan;

/// Fills the missing cells of one column of a dataset.
///
/// Implementors read the dataset and return a new column; the dataset itself
/// is left untouched. After a successful call the returned column has no
/// missing cells and every originally observed cell keeps its value.
pub trait ColumnImputer {
    fn impute(&self, dataset: &Dataset, column: &str) -> ImputationResult<Column>;
}

// Looks up a numeric column, rejecting categorical ones
fn numeric_values<'d>(dataset: &'d Dataset, name: &str) -> ImputationResult<&'d Array1D> {
    match dataset.column(name)? {
        Column::Numeric(values) => Ok(values),
        other => Err(kind_mismatch(name, ColumnKind::Numeric, other.kind())),
    }
}

// Looks up a categorical column, rejecting numeric ones
fn categorical_values<'d>(
    dataset: &'d Dataset,
    name: &str,
) -> ImputationResult<&'d [Option<String>]> {
    match dataset.column(name)? {
        Column::Categorical(values) => Ok(values),
        other => Err(kind_mismatch(name, ColumnKind::Categorical, other.kind())),
    }
}

fn kind_mismatch(name: &str, expected: ColumnKind, actual: ColumnKind) -> ImputationError {
    ImputationError::ColumnKindMismatch {
        column: name.to_string(),
        expected: expected.name(),
        actual: actual.name(),
    }
}

// Rounds a percentage to two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
