use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::{Column, Dataset};
use crate::error::{ImputationError, ImputationResult};
use crate::parameters::preprocessing::{
    CategoricalStrategy, ImputationStrategy, NumericStrategy, MISSING_CATEGORY,
};
use crate::types::Array1D;

use super::{categorical_values, numeric_values, ColumnImputer};

/// Fills missing numeric cells (`NaN`).
///
/// # Examples
///
/// ```
/// use missingness::dataset::{Column, Dataset};
/// use missingness::parameters::NumericStrategy;
/// use missingness::preprocessing::ColumnImputer;
///
/// let dataset = Dataset::from_columns(vec![
///     ("x", Column::numeric(vec![1.0, f64::NAN, 4.0])),
/// ])
/// .unwrap();
///
/// let filled = NumericStrategy::Mean.impute(&dataset, "x").unwrap();
/// assert_eq!(filled.as_numeric().unwrap().to_vec(), vec![1.0, 2.5, 4.0]);
/// ```
impl ColumnImputer for NumericStrategy {
    fn impute(&self, dataset: &Dataset, column: &str) -> ImputationResult<Column> {
        let values = numeric_values(dataset, column)?;
        let source = dataset.column(column)?;
        if !source.has_missing() {
            return Ok(Column::Numeric(values.clone()));
        }
        let missing = source.missing_count();

        let observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if observed.is_empty() {
            return Err(ImputationError::NoObservedValues(column.to_string()));
        }

        let filled = match *self {
            NumericStrategy::Mean => fill_constant(values, mean(&observed)),
            NumericStrategy::Median => fill_constant(values, median(observed)),
            NumericStrategy::Mode => fill_constant(values, numeric_mode(&observed)),
            NumericStrategy::Random { seed } => {
                let pool: Vec<f64> = observed
                    .iter()
                    // -0.0 and 0.0 are one value
                    .map(|&v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
                    .collect::<IndexSet<u64>>()
                    .into_iter()
                    .map(f64::from_bits)
                    .collect();
                let mut rng = StdRng::seed_from_u64(seed);
                values
                    .iter()
                    .map(|&v| {
                        if v.is_nan() {
                            pool[rng.gen_range(0..pool.len())]
                        } else {
                            v
                        }
                    })
                    .collect::<Array1D>()
            }
            NumericStrategy::Knn { neighbors } => {
                if neighbors == 0 {
                    return Err(ImputationError::InvalidNeighborCount);
                }
                knn_fill(dataset, column, values, neighbors, mean(&observed))
            }
        };
        if filled.iter().any(|v| v.is_nan()) {
            return Err(ImputationError::NonFiniteFill(column.to_string()));
        }

        debug!("Imputed {} missing values in '{}' with {:?}", missing, column, self);
        Ok(Column::Numeric(filled))
    }
}

/// Fills missing categorical cells (`None`).
impl ColumnImputer for CategoricalStrategy {
    fn impute(&self, dataset: &Dataset, column: &str) -> ImputationResult<Column> {
        let labels = categorical_values(dataset, column)?;
        let missing = labels.iter().filter(|v| v.is_none()).count();
        if missing == 0 {
            return Ok(Column::Categorical(labels.to_vec()));
        }

        let observed: Vec<&str> = labels.iter().filter_map(|v| v.as_deref()).collect();
        if observed.is_empty() && *self != CategoricalStrategy::NewCategory {
            return Err(ImputationError::NoObservedValues(column.to_string()));
        }

        let filled = match *self {
            CategoricalStrategy::Mode => {
                let mode = categorical_mode(&observed).to_string();
                fill_labels(labels, || mode.clone())
            }
            CategoricalStrategy::NewCategory => {
                fill_labels(labels, || MISSING_CATEGORY.to_string())
            }
            CategoricalStrategy::Random { seed } => {
                let pool: Vec<&str> = observed
                    .iter()
                    .copied()
                    .collect::<IndexSet<&str>>()
                    .into_iter()
                    .collect();
                let mut rng = StdRng::seed_from_u64(seed);
                fill_labels(labels, || pool[rng.gen_range(0..pool.len())].to_string())
            }
        };

        debug!("Imputed {} missing labels in '{}' with {:?}", missing, column, self);
        Ok(Column::Categorical(filled))
    }
}

impl ColumnImputer for ImputationStrategy {
    fn impute(&self, dataset: &Dataset, column: &str) -> ImputationResult<Column> {
        match self {
            ImputationStrategy::Numeric(strategy) => strategy.impute(dataset, column),
            ImputationStrategy::Categorical(strategy) => strategy.impute(dataset, column),
        }
    }
}

fn fill_constant(values: &Array1D, fill: f64) -> Array1D {
    values.mapv(|v| if v.is_nan() { fill } else { v })
}

fn fill_labels<F>(labels: &[Option<String>], mut fill: F) -> Vec<Option<String>>
where
    F: FnMut() -> String,
{
    labels
        .iter()
        .map(|label| match label {
            Some(label) => Some(label.clone()),
            None => Some(fill()),
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

// Most frequent value; ties go to the smallest value
fn numeric_mode(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &v in values {
        *counts.entry(v.to_bits()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(bits, count)| (f64::from_bits(bits), count))
        .max_by(|(a, count_a), (b, count_b)| {
            count_a
                .cmp(count_b)
                .then_with(|| b.partial_cmp(a).unwrap_or(Ordering::Equal))
        })
        .map(|(value, _)| value)
        .unwrap_or(f64::NAN)
}

// Most frequent label; ties go to the lexicographically smallest label
fn categorical_mode<'a>(labels: &[&'a str]) -> &'a str {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label).unwrap_or(MISSING_CATEGORY)
}

/// Replaces each missing cell with the average of the `k` nearest donor rows.
///
/// Distances are measured on the other numeric columns of the dataset, using
/// only coordinates present in both rows and scaled up by
/// `total / present` coordinates. Rows with no usable donor get `fallback`.
fn knn_fill(
    dataset: &Dataset,
    target: &str,
    values: &Array1D,
    k: usize,
    fallback: f64,
) -> Array1D {
    let features: Vec<&Array1D> = dataset
        .columns()
        .filter(|(name, _)| *name != target)
        .filter_map(|(_, column)| column.as_numeric())
        .collect();
    let donors: Vec<usize> = (0..values.len()).filter(|&r| !values[r].is_nan()).collect();

    let distance = |a: usize, b: usize| -> Option<f64> {
        let mut sum_sq = 0.0;
        let mut present = 0usize;
        for feature in &features {
            let (x, y) = (feature[a], feature[b]);
            if !x.is_nan() && !y.is_nan() {
                sum_sq += (x - y) * (x - y);
                present += 1;
            }
        }
        if present == 0 {
            None
        } else {
            Some((features.len() as f64 / present as f64 * sum_sq).sqrt())
        }
    };

    let mut filled = values.clone();
    for row in (0..values.len()).filter(|&r| values[r].is_nan()) {
        let mut candidates: Vec<(f64, usize)> = donors
            .iter()
            .filter_map(|&donor| distance(row, donor).map(|d| (d, donor)))
            .collect();

        filled[row] = if candidates.is_empty() {
            fallback
        } else {
            candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            let nearest = &candidates[..k.min(candidates.len())];
            nearest.iter().map(|&(_, donor)| values[donor]).sum::<f64>() / nearest.len() as f64
        };
    }
    filled
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::dataset::ColumnKind;

    const NAN: f64 = f64::NAN;

    fn numeric_dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("x", Column::numeric(vec![1.0, NAN, 2.0, 2.0, NAN, 9.0])),
            ("y", Column::numeric(vec![10.0, 11.0, 20.0, 21.0, 89.0, 90.0])),
            ("z", Column::categorical(vec![Some("b"), None, Some("a"), Some("b"), None, Some("a")])),
        ])
        .unwrap()
    }

    fn filled_numeric(strategy: NumericStrategy) -> Vec<f64> {
        strategy
            .impute(&numeric_dataset(), "x")
            .unwrap()
            .as_numeric()
            .unwrap()
            .to_vec()
    }

    fn filled_labels(strategy: CategoricalStrategy) -> Vec<Option<String>> {
        strategy
            .impute(&numeric_dataset(), "z")
            .unwrap()
            .as_categorical()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_mean_median_mode() {
        assert_eq!(filled_numeric(NumericStrategy::Mean), vec![1.0, 3.5, 2.0, 2.0, 3.5, 9.0]);
        assert_eq!(filled_numeric(NumericStrategy::Median), vec![1.0, 2.0, 2.0, 2.0, 2.0, 9.0]);
        assert_eq!(filled_numeric(NumericStrategy::Mode), vec![1.0, 2.0, 2.0, 2.0, 2.0, 9.0]);
    }

    #[test]
    fn test_numeric_mode_ties_pick_smallest() {
        assert_eq!(numeric_mode(&[3.0, 1.0, 3.0, 1.0, 7.0]), 1.0);
        assert_eq!(numeric_mode(&[5.0]), 5.0);
    }

    #[test]
    fn test_random_draws_from_observed_values() {
        let first = filled_numeric(NumericStrategy::Random { seed: 7 });
        let again = filled_numeric(NumericStrategy::Random { seed: 7 });
        assert_eq!(first, again);
        for &row in &[1, 4] {
            assert!([1.0, 2.0, 9.0].contains(&first[row]));
        }
        assert_eq!(first[0], 1.0);
        assert_eq!(first[5], 9.0);
    }

    #[test]
    fn test_undefined_fill_is_an_error() {
        let dataset = Dataset::from_columns(vec![
            ("x", Column::numeric(vec![f64::INFINITY, f64::NEG_INFINITY, NAN])),
            ("y", Column::numeric(vec![1.0, 2.0, 3.0])),
        ])
        .unwrap();

        for strategy in [
            NumericStrategy::Mean,
            NumericStrategy::Median,
            NumericStrategy::Knn { neighbors: 2 },
        ] {
            assert_eq!(
                strategy.impute(&dataset, "x"),
                Err(ImputationError::NonFiniteFill("x".to_string()))
            );
        }

        // a single infinite donor is still a usable fill
        let filled = NumericStrategy::Mode.impute(&dataset, "x").unwrap();
        assert_eq!(filled.missing_count(), 0);
    }

    #[test]
    fn test_random_treats_signed_zeros_as_one_value() {
        let dataset = Dataset::from_columns(vec![(
            "x",
            Column::numeric(vec![0.0, -0.0, 7.0, NAN, NAN, NAN, NAN, NAN, NAN]),
        )])
        .unwrap();
        for seed in 0..8 {
            let filled = NumericStrategy::Random { seed }.impute(&dataset, "x").unwrap();
            let values = filled.as_numeric().unwrap();
            assert!(values.iter().skip(3).all(|v| v.is_sign_positive()));
            assert!(values.iter().skip(3).all(|&v| v == 0.0 || v == 7.0));
        }
    }

    #[test]
    fn test_knn_uses_nearest_rows() {
        // row 1 (y=11) sits next to rows 0 and 2 (y=10, y=20); row 4 (y=89) next to 5 and 3
        let filled = filled_numeric(NumericStrategy::Knn { neighbors: 2 });
        assert_relative_eq!(filled[1], 1.5);
        assert_relative_eq!(filled[4], 5.5);
        assert_eq!(filled[2], 2.0);
    }

    #[test]
    fn test_knn_without_features_falls_back_to_mean() {
        let dataset = Dataset::from_columns(vec![
            ("x", Column::numeric(vec![1.0, NAN, 5.0])),
        ])
        .unwrap();
        let filled = NumericStrategy::Knn { neighbors: 3 }.impute(&dataset, "x").unwrap();
        assert_eq!(filled.as_numeric().unwrap().to_vec(), vec![1.0, 3.0, 5.0]);

        let result = NumericStrategy::Knn { neighbors: 0 }.impute(&dataset, "x");
        assert_eq!(result, Err(ImputationError::InvalidNeighborCount));
    }

    #[test]
    fn test_categorical_strategies() {
        let mode = filled_labels(CategoricalStrategy::Mode);
        assert_eq!(mode[1].as_deref(), Some("a"));
        assert_eq!(mode[4].as_deref(), Some("a"));

        let new_category = filled_labels(CategoricalStrategy::NewCategory);
        assert_eq!(new_category[1].as_deref(), Some(MISSING_CATEGORY));
        assert_eq!(new_category[0].as_deref(), Some("b"));

        let random = filled_labels(CategoricalStrategy::Random { seed: 3 });
        assert_eq!(random, filled_labels(CategoricalStrategy::Random { seed: 3 }));
        assert!(matches!(random[1].as_deref(), Some("a") | Some("b")));
    }

    #[test]
    fn test_complete_column_is_unchanged() {
        let dataset = numeric_dataset();
        let filled = NumericStrategy::Mean.impute(&dataset, "y").unwrap();
        assert_eq!(&filled, dataset.column("y").unwrap());
    }

    #[test]
    fn test_all_missing_column() {
        let dataset = Dataset::from_columns(vec![
            ("x", Column::numeric(vec![NAN, NAN])),
            ("c", Column::categorical(vec![None::<&str>, None])),
        ])
        .unwrap();
        assert_eq!(
            NumericStrategy::Median.impute(&dataset, "x"),
            Err(ImputationError::NoObservedValues("x".to_string()))
        );
        assert!(CategoricalStrategy::Mode.impute(&dataset, "c").is_err());
        let filled = CategoricalStrategy::NewCategory.impute(&dataset, "c").unwrap();
        assert_eq!(filled.missing_count(), 0);
    }

    #[test]
    fn test_kind_mismatch_and_unknown_column() {
        let dataset = numeric_dataset();
        let result = NumericStrategy::Mean.impute(&dataset, "z");
        assert_eq!(
            result,
            Err(ImputationError::ColumnKindMismatch {
                column: "z".to_string(),
                expected: ColumnKind::Numeric.name(),
                actual: ColumnKind::Categorical.name(),
            })
        );
        assert!(CategoricalStrategy::Mode.impute(&dataset, "x").is_err());
        assert!(matches!(
            ImputationStrategy::Numeric(NumericStrategy::Mean).impute(&dataset, "nope"),
            Err(ImputationError::Dataset(_))
        ));
    }

    #[test]
    fn test_every_strategy_keeps_observed_cells() {
        let dataset = numeric_dataset();
        let numeric = [
            NumericStrategy::Mean,
            NumericStrategy::Median,
            NumericStrategy::Mode,
            NumericStrategy::Random { seed: 1 },
            NumericStrategy::Knn { neighbors: 3 },
        ];
        let original = dataset.column("x").unwrap();
        for strategy in numeric {
            let filled = ImputationStrategy::from(strategy).impute(&dataset, "x").unwrap();
            assert_eq!(filled.missing_count(), 0, "{strategy:?}");
            let unchanged = (0..original.len())
                .filter(|&r| !original.is_missing(r))
                .filter(|&r| filled.as_numeric().unwrap()[r] == original.as_numeric().unwrap()[r])
                .count();
            assert_eq!(unchanged, original.observed_count(), "{strategy:?}");
        }

        let original = dataset.column("z").unwrap();
        for strategy in [
            CategoricalStrategy::Mode,
            CategoricalStrategy::NewCategory,
            CategoricalStrategy::Random { seed: 1 },
        ] {
            let filled = ImputationStrategy::from(strategy).impute(&dataset, "z").unwrap();
            assert_eq!(filled.missing_count(), 0, "{strategy:?}");
            let before = original.as_categorical().unwrap();
            let after = filled.as_categorical().unwrap();
            for r in (0..before.len()).filter(|&r| before[r].is_some()) {
                assert_eq!(before[r], after[r]);
            }
        }
    }
}
