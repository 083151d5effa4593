//! Missing-Completely-At-Random testing.
//!
//! [`pattern`] groups rows by which partially-missing columns they lack;
//! [`tester`] scores each group and pools the scores into a chi-squared test.

pub mod pattern;
pub mod tester;

pub use self::pattern::{MissingPattern, MissingnessMatrix, PatternGroup, PatternGroups};
pub use self::tester::{
    evaluate_group, is_mcar, p_value, GroupContribution, GroupOutcome, McarReport, McarTest,
    SkipReason, TestAccumulator,
};
