/// Label written into categorical cells filled by [`CategoricalStrategy::NewCategory`].
pub const MISSING_CATEGORY: &str = "Missing";

/// Imputation strategies for numeric columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericStrategy {
    Mean,
    Median,
    Mode,
    /// Draw uniformly from the distinct observed values.
    Random { seed: u64 },
    /// Average of the nearest rows, measured on the other numeric columns.
    Knn { neighbors: usize },
}

impl NumericStrategy {
    /// Nearest-neighbor strategy sized to the dataset: 5% of the rows,
    /// clamped to `[2, 5]`.
    pub fn knn_auto(num_rows: usize) -> Self {
        let neighbors = (num_rows / 20).clamp(2, 5);
        NumericStrategy::Knn { neighbors }
    }
}

/// Imputation strategies for categorical columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CategoricalStrategy {
    Mode,
    /// Fill with the [`MISSING_CATEGORY`] label.
    NewCategory,
    /// Draw uniformly from the distinct observed labels.
    Random { seed: u64 },
}

/// A strategy for either column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "use_serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImputationStrategy {
    Numeric(NumericStrategy),
    Categorical(CategoricalStrategy),
}

impl From<NumericStrategy> for ImputationStrategy {
    fn from(strategy: NumericStrategy) -> Self {
        ImputationStrategy::Numeric(strategy)
    }
}

impl From<CategoricalStrategy> for ImputationStrategy {
    fn from(strategy: CategoricalStrategy) -> Self {
        ImputationStrategy::Categorical(strategy)
    }
}
