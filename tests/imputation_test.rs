use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use missingness::dataset::{Column, Dataset};
use missingness::parameters::{CategoricalStrategy, ImputationStrategy, NumericStrategy};
use missingness::preprocessing::cca::{complete_case_analysis, MissingnessSummary};
use missingness::preprocessing::plan::ImputationPlan;
use missingness::preprocessing::ColumnImputer;

const ROWS: usize = 60;

fn dataset(seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels = ["red", "green", "blue"];
    let x: Vec<f64> = (0..ROWS)
        .map(|_| {
            if rng.gen_bool(0.2) {
                f64::NAN
            } else {
                rng.gen_range(0.0..100.0)
            }
        })
        .collect();
    let y: Vec<f64> = (0..ROWS)
        .map(|_| {
            if rng.gen_bool(0.1) {
                f64::NAN
            } else {
                rng.gen_range(-5.0..5.0)
            }
        })
        .collect();
    let color: Vec<Option<&str>> = (0..ROWS)
        .map(|_| {
            if rng.gen_bool(0.25) {
                None
            } else {
                Some(labels[rng.gen_range(0..labels.len())])
            }
        })
        .collect();

    Dataset::from_columns(vec![
        ("x", Column::numeric(x)),
        ("y", Column::numeric(y)),
        ("color", Column::categorical(color)),
    ])
    .unwrap()
}

fn unchanged_cells(before: &Column, after: &Column) -> usize {
    match (before, after) {
        (Column::Numeric(b), Column::Numeric(a)) => b
            .iter()
            .zip(a.iter())
            .filter(|(b, a)| !b.is_nan() && b == a)
            .count(),
        (Column::Categorical(b), Column::Categorical(a)) => b
            .iter()
            .zip(a.iter())
            .filter(|(b, a)| b.is_some() && b == a)
            .count(),
        _ => 0,
    }
}

#[test]
fn test_every_strategy_fills_and_preserves_observed_cells() {
    let strategies: Vec<(&str, ImputationStrategy)> = vec![
        ("x", NumericStrategy::Mean.into()),
        ("x", NumericStrategy::Median.into()),
        ("x", NumericStrategy::Mode.into()),
        ("x", NumericStrategy::Random { seed: 4 }.into()),
        ("x", NumericStrategy::knn_auto(ROWS).into()),
        ("color", CategoricalStrategy::Mode.into()),
        ("color", CategoricalStrategy::NewCategory.into()),
        ("color", CategoricalStrategy::Random { seed: 4 }.into()),
    ];

    for seed in 0..5 {
        let data = dataset(seed);
        for (name, strategy) in &strategies {
            let original = data.column(name).unwrap();
            let k = original.missing_count();
            let filled = strategy.impute(&data, name).unwrap();

            assert_eq!(filled.len(), original.len());
            assert_eq!(filled.missing_count(), 0, "{strategy:?}");
            assert_eq!(
                unchanged_cells(original, &filled),
                original.len() - k,
                "{strategy:?}"
            );
        }
    }
}

#[test]
fn test_plan_then_cca_keeps_every_row() {
    let data = dataset(21);
    let before = MissingnessSummary::from_dataset(&data);
    assert!(before.incomplete_rows > 0);
    assert!(complete_case_analysis(&data).row_count() < data.row_count());

    let plan = ImputationPlan::new()
        .with("y", NumericStrategy::Median)
        .with("x", NumericStrategy::Knn { neighbors: 3 })
        .with("color", CategoricalStrategy::Mode);
    let filled = plan.apply(&data).unwrap();

    let after = MissingnessSummary::from_dataset(&filled);
    assert_eq!(after.total_missing, 0);
    assert_eq!(after.data_loss_percentage, 0.0);
    assert_eq!(complete_case_analysis(&filled).row_count(), data.row_count());
}
