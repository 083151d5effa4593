//! Missingness pattern extraction.
//!
//! Columns that are neither fully observed nor fully missing are retained,
//! each row gets a bit vector over those columns (bit set = missing), and
//! rows sharing a bit vector form one [`PatternGroup`].

use indexmap::IndexMap;
use log::debug;
use ndarray::Array2;

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{McarError, McarResult};
use crate::types::Array2D;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-width bit vector over the retained columns, one bit per column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissingPattern {
    words: Vec<u64>,
    width: usize,
}

impl MissingPattern {
    fn empty(width: usize) -> Self {
        MissingPattern {
            words: vec![0; width.div_ceil(WORD_BITS)],
            width,
        }
    }

    fn set_missing(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Builds a pattern from explicit flags, `true` meaning missing.
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut pattern = MissingPattern::empty(flags.len());
        for (i, &missing) in flags.iter().enumerate() {
            if missing {
                pattern.set_missing(i);
            }
        }
        pattern
    }

    /// Returns `true` if retained column `index` is missing in this pattern.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn is_missing(&self, index: usize) -> bool {
        assert!(index < self.width, "pattern index {index} out of range {}", self.width);
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn missing_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn to_flags(&self) -> Vec<bool> {
        (0..self.width).map(|i| self.is_missing(i)).collect()
    }
}

/// Rows sharing one missingness pattern, with the numeric columns that are
/// fully observed inside the group.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternGroup {
    pub pattern: MissingPattern,
    /// Row indices into the source dataset, ascending.
    pub rows: Vec<usize>,
    /// Retained columns with no missing cell among `rows`, any kind.
    pub observed_columns: Vec<String>,
    /// Names of the columns of `observed_numeric`, in order.
    pub numeric_columns: Vec<String>,
    /// `rows.len()` x `numeric_columns.len()` sub-table of observed numeric values.
    pub observed_numeric: Array2D,
}

impl PatternGroup {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn numeric_column_count(&self) -> usize {
        self.numeric_columns.len()
    }
}

/// Boolean missingness view over the partially-missing columns of a dataset.
///
/// # Examples
///
/// ```
/// use missingness::dataset::{Column, Dataset};
/// use missingness::mcar::MissingnessMatrix;
///
/// let dataset = Dataset::from_columns(vec![
///     ("a", Column::numeric(vec![1.0, f64::NAN, 3.0, 4.0])),
///     ("b", Column::numeric(vec![f64::NAN, 2.0, 3.0, 4.0])),
///     ("c", Column::numeric(vec![1.0, 2.0, 3.0, 4.0])),
/// ])
/// .unwrap();
///
/// let matrix = MissingnessMatrix::from_dataset(&dataset).unwrap();
/// assert_eq!(matrix.retained_columns().collect::<Vec<_>>(), vec!["a", "b"]);
/// assert_eq!(matrix.pattern_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MissingnessMatrix<'a> {
    dataset: &'a Dataset,
    /// Dataset column indices of the retained columns.
    retained: Vec<usize>,
    row_patterns: Vec<MissingPattern>,
    index: IndexMap<MissingPattern, Vec<usize>>,
}

impl<'a> MissingnessMatrix<'a> {
    /// Filters the dataset down to partially-missing columns and indexes rows by pattern.
    ///
    /// # Errors
    ///
    /// * `McarError::InvalidInput` - if the dataset has no rows
    /// * `McarError::InsufficientColumns` - if fewer than two columns are partially missing
    pub fn from_dataset(dataset: &'a Dataset) -> McarResult<Self> {
        let num_rows = dataset.row_count();
        if num_rows == 0 {
            return Err(McarError::InvalidInput("dataset has no rows".to_string()));
        }

        let retained: Vec<usize> = dataset
            .columns()
            .enumerate()
            .filter(|(_, (_, column))| {
                let missing = column.missing_count();
                missing > 0 && missing < num_rows
            })
            .map(|(i, _)| i)
            .collect();

        if retained.len() < 2 {
            return Err(McarError::InsufficientColumns {
                found: retained.len(),
            });
        }

        let row_patterns: Vec<MissingPattern> = (0..num_rows)
            .map(|row| {
                let mut pattern = MissingPattern::empty(retained.len());
                for (j, &col) in retained.iter().enumerate() {
                    if dataset.is_missing(row, col) {
                        pattern.set_missing(j);
                    }
                }
                pattern
            })
            .collect();

        let mut index: IndexMap<MissingPattern, Vec<usize>> = IndexMap::new();
        for (row, pattern) in row_patterns.iter().enumerate() {
            index.entry(pattern.clone()).or_default().push(row);
        }

        debug!(
            "Missingness matrix: {} of {} columns retained, {} patterns over {} rows",
            retained.len(),
            dataset.column_count(),
            index.len(),
            num_rows
        );

        Ok(MissingnessMatrix {
            dataset,
            retained,
            row_patterns,
            index,
        })
    }

    pub fn retained_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.retained
            .iter()
            .filter_map(move |&col| self.dataset.column_at(col).map(|(name, _)| name))
    }

    pub fn retained_count(&self) -> usize {
        self.retained.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_patterns.len()
    }

    /// Returns `true` if retained column `col` is missing at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        self.row_patterns[row].is_missing(col)
    }

    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_pattern(&self, row: usize) -> &MissingPattern {
        &self.row_patterns[row]
    }

    pub fn pattern_count(&self) -> usize {
        self.index.len()
    }

    /// Iterates the pattern groups in first-seen order.
    ///
    /// Each group's observed sub-table is only built when the group is yielded.
    pub fn groups(&self) -> PatternGroups<'_> {
        PatternGroups {
            dataset: self.dataset,
            retained: &self.retained,
            inner: self.index.iter(),
        }
    }
}

/// Iterator returned by [`MissingnessMatrix::groups`].
pub struct PatternGroups<'m> {
    dataset: &'m Dataset,
    retained: &'m [usize],
    inner: indexmap::map::Iter<'m, MissingPattern, Vec<usize>>,
}

impl<'m> PatternGroups<'m> {
    fn build_group(&self, pattern: &MissingPattern, rows: &[usize]) -> PatternGroup {
        let mut observed_columns = Vec::new();
        let mut numeric_columns = Vec::new();
        let mut numeric_values = Vec::new();

        // Observation is re-checked on the group's rows rather than read off the pattern.
        for &col in self.retained {
            let Some((name, column)) = self.dataset.column_at(col) else {
                continue;
            };
            if rows.iter().any(|&row| column.is_missing(row)) {
                continue;
            }
            observed_columns.push(name.to_string());
            if column.kind() == ColumnKind::Numeric {
                if let Some(values) = column.as_numeric() {
                    numeric_columns.push(name.to_string());
                    numeric_values.push(values);
                }
            }
        }

        let observed_numeric = Array2::from_shape_fn(
            (rows.len(), numeric_values.len()),
            |(i, j)| numeric_values[j][rows[i]],
        );

        PatternGroup {
            pattern: pattern.clone(),
            rows: rows.to_vec(),
            observed_columns,
            numeric_columns,
            observed_numeric,
        }
    }
}

impl<'m> Iterator for PatternGroups<'m> {
    type Item = PatternGroup;

    fn next(&mut self) -> Option<Self::Item> {
        let (pattern, rows) = self.inner.next()?;
        Some(self.build_group(pattern, rows))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'m> ExactSizeIterator for PatternGroups<'m> {}
