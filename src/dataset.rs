use indexmap::IndexMap;
use log::debug;
use ndarray::Array1;

use crate::error::{DatasetError, DatasetResult};
use crate::types::Array1D;

/// Semantic type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// A single column of cells sharing one semantic type.
///
/// Numeric cells use `NaN` as the missing marker, categorical cells use `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Array1D),
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Creates a numeric column. `NaN` values are treated as missing.
    pub fn numeric<V: Into<Vec<f64>>>(values: V) -> Self {
        Column::Numeric(Array1::from(values.into()))
    }

    /// Creates a numeric column from optional values, `None` becoming `NaN`.
    pub fn numeric_from_options<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Column::Numeric(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }

    /// Creates a categorical column from optional labels.
    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Column::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Returns `true` if the cell at `row` is missing.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Numeric(values) => values[row].is_nan(),
            Column::Categorical(values) => values[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_nan()).count(),
            Column::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn observed_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    pub fn has_missing(&self) -> bool {
        self.missing_count() > 0
    }

    pub fn as_numeric(&self) -> Option<&Array1D> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Numeric(_) => None,
            Column::Categorical(values) => Some(values),
        }
    }

    /// Builds a new column holding only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&r| values[r]).collect()),
            Column::Categorical(values) => {
                Column::Categorical(rows.iter().map(|&r| values[r].clone()).collect())
            }
        }
    }
}

/// Rectangular table of named columns, kept in insertion order.
///
/// All columns share the same row count. Analysis code only reads a dataset;
/// imputation produces new columns and new datasets.
///
/// # Examples
///
/// ```
/// use missingness::dataset::{Column, Dataset};
///
/// let dataset = Dataset::from_columns(vec![
///     ("age", Column::numeric(vec![31.0, f64::NAN, 45.0])),
///     ("city", Column::categorical(vec![Some("Oslo"), None, Some("Lima")])),
/// ])
/// .unwrap();
///
/// assert_eq!(dataset.row_count(), 3);
/// assert!(dataset.is_missing(1, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: IndexMap<String, Column>,
    num_rows: usize,
}

impl Dataset {
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Builds a dataset from `(name, column)` pairs, in order.
    pub fn from_columns<I, S>(columns: I) -> DatasetResult<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut dataset = Dataset::new();
        for (name, column) in columns {
            dataset.push_column(name, column)?;
        }
        debug!(
            "Built dataset with shape: {}x{}",
            dataset.row_count(),
            dataset.column_count()
        );
        Ok(dataset)
    }

    /// Appends a column. The first column fixes the row count.
    pub fn push_column<S: Into<String>>(&mut self, name: S, column: Column) -> DatasetResult<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.num_rows = column.len();
        } else if column.len() != self.num_rows {
            return Err(DatasetError::LengthMismatch {
                name,
                expected: self.num_rows,
                actual: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Swaps in a new column under an existing name, keeping its position.
    pub fn replace_column(&mut self, name: &str, column: Column) -> DatasetResult<()> {
        if column.len() != self.num_rows {
            return Err(DatasetError::LengthMismatch {
                name: name.to_string(),
                expected: self.num_rows,
                actual: column.len(),
            });
        }
        let slot = self
            .columns
            .get_mut(name)
            .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))?;
        *slot = column;
        Ok(())
    }

    pub fn column(&self, name: &str) -> DatasetResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| DatasetError::ColumnNotFound(name.to_string()))
    }

    pub fn column_at(&self, index: usize) -> Option<(&str, &Column)> {
        self.columns
            .get_index(index)
            .map(|(name, column)| (name.as_str(), column))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    pub fn row_count(&self) -> usize {
        self.num_rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Returns `true` if the cell at (`row`, column index `col`) is missing.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        self.columns[col].is_missing(row)
    }

    /// Returns `true` if any cell in `row` is missing.
    pub fn row_has_missing(&self, row: usize) -> bool {
        self.columns.values().any(|column| column.is_missing(row))
    }

    /// Builds a new dataset with only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), column.select_rows(rows)))
            .collect();
        Dataset {
            columns,
            num_rows: rows.len(),
        }
    }
}
