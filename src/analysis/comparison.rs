use serde::Serialize;

use crate::dataset::IndicatorRow;
use crate::error::ScoreUnavailable;
use crate::scoring::{ProgressScorer, ScoreBreakdown};

/// Two countries scored on the same fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub first: ScoreBreakdown,
    pub second: ScoreBreakdown,
    /// `None` on a tie
    pub leader: Option<String>,
    /// Absolute score gap in points
    pub difference: f64,
}

pub fn compare<R: AsRef<IndicatorRow>>(
    scorer: &ProgressScorer<'_, R>,
    first: &str,
    second: &str,
    year: i32,
) -> Result<Comparison, ScoreUnavailable> {
    let first = scorer.score(first, year)?;
    let second = scorer.score(second, year)?;

    let difference = (first.score - second.score).abs();
    let leader = if first.score > second.score {
        Some(first.country.clone())
    } else if second.score > first.score {
        Some(second.country.clone())
    } else {
        None
    };

    Ok(Comparison {
        first,
        second,
        leader,
        difference,
    })
}
