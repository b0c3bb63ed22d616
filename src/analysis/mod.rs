//! Read-only views over a tagged dataset.

pub mod comparison;
pub mod correlation;
pub mod regions;
pub mod summary;

pub use comparison::{compare, Comparison};
pub use correlation::{correlate, CorrelationInsight, CorrelationStrength, Direction};
pub use regions::{
    compare_regions, latest_value, region_trend, yearly_means, RegionComparison, RegionTrend,
    TrendDirection, YearValue,
};
pub use summary::{summarize, ContinentSummary, SummaryTable};
