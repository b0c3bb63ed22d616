use serde::Serialize;

use super::summary::mean;
use crate::continent::{ContinentLabel, RegionalDataset};
use crate::dataset::Indicator;
use crate::error::InsightError;

/// Continent mean of one indicator in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Per-year continent means of `indicator`, oldest first.
///
/// Years where no country in `region` reported the indicator are skipped.
pub fn yearly_means(
    dataset: &RegionalDataset,
    region: ContinentLabel,
    indicator: Indicator,
) -> Vec<YearValue> {
    dataset
        .years()
        .into_iter()
        .filter_map(|year| {
            let selected = dataset.select(Some(year), Some(region));
            let value = mean(selected.iter().filter_map(|t| t.row.get(indicator)))?;
            Some(YearValue { year, value })
        })
        .collect()
}

/// Most recent continent mean for `indicator`
pub fn latest_value(
    dataset: &RegionalDataset,
    region: ContinentLabel,
    indicator: Indicator,
) -> Result<YearValue, InsightError> {
    yearly_means(dataset, region, indicator)
        .pop()
        .ok_or(InsightError::NoData { region, indicator })
}

/// Latest value of one indicator for two continents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionComparison {
    pub indicator: Indicator,
    pub first: ContinentLabel,
    pub first_value: YearValue,
    pub second: ContinentLabel,
    pub second_value: YearValue,
    /// Continent with the larger value; `None` on a tie
    pub higher: Option<ContinentLabel>,
    /// Gap relative to the smaller value, in percent; `None` when that value is zero
    pub percent_gap: Option<f64>,
}

impl RegionComparison {
    /// Continent doing better once the indicator's direction is taken into account
    pub fn better(&self) -> Option<ContinentLabel> {
        let higher = self.higher?;
        if self.indicator.higher_is_better() {
            Some(higher)
        } else if higher == self.first {
            Some(self.second)
        } else {
            Some(self.first)
        }
    }

    pub fn narrative(&self) -> String {
        let Some(higher) = self.higher else {
            return format!(
                "{} and {} report the same {}.",
                self.first,
                self.second,
                self.indicator.label().to_lowercase()
            );
        };
        let lower = if higher == self.first {
            self.second
        } else {
            self.first
        };
        let mut text = match self.percent_gap {
            Some(gap) => format!(
                "{} has higher {} than {} by {:.2}%.",
                higher,
                self.indicator.label().to_lowercase(),
                lower,
                gap
            ),
            None => format!(
                "{} has higher {} than {}.",
                higher,
                self.indicator.label().to_lowercase(),
                lower
            ),
        };
        if !self.indicator.higher_is_better() {
            text.push_str(&format!(" Lower is better, so {} is ahead.", lower));
        }
        text
    }
}

/// Compare the latest continent mean of `indicator` for two continents.
///
/// Each continent uses its own most recent year with data, so the two years can differ.
pub fn compare_regions(
    dataset: &RegionalDataset,
    indicator: Indicator,
    first: ContinentLabel,
    second: ContinentLabel,
) -> Result<RegionComparison, InsightError> {
    if first == second {
        return Err(InsightError::SameRegion(first));
    }
    let first_value = latest_value(dataset, first, indicator)?;
    let second_value = latest_value(dataset, second, indicator)?;

    let (a, b) = (first_value.value, second_value.value);
    let higher = if a > b {
        Some(first)
    } else if b > a {
        Some(second)
    } else {
        None
    };
    let smaller = a.min(b);
    let percent_gap = (smaller != 0.0).then(|| (a - b).abs() / smaller.abs() * 100.0);

    Ok(RegionComparison {
        indicator,
        first,
        first_value,
        second,
        second_value,
        higher,
        percent_gap,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

/// How a continent's mean of one indicator moved across the dataset's years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTrend {
    pub region: ContinentLabel,
    pub indicator: Indicator,
    pub points: Vec<YearValue>,
    pub direction: TrendDirection,
}

impl RegionTrend {
    pub fn first(&self) -> YearValue {
        self.points[0]
    }

    pub fn last(&self) -> YearValue {
        self.points[self.points.len() - 1]
    }

    pub fn change(&self) -> f64 {
        self.last().value - self.first().value
    }

    pub fn narrative(&self) -> String {
        let (first, last) = (self.first(), self.last());
        let verb = match self.direction {
            TrendDirection::Rising => "rose",
            TrendDirection::Falling => "fell",
            TrendDirection::Flat => "held steady",
        };
        format!(
            "{} in {} {} from {:.2} ({}) to {:.2} ({}).",
            self.indicator.label(),
            self.region,
            verb,
            first.value,
            first.year,
            last.value,
            last.year
        )
    }
}

/// Per-year continent mean of `indicator`, compared first year to last.
///
/// Needs data in at least two years.
pub fn region_trend(
    dataset: &RegionalDataset,
    region: ContinentLabel,
    indicator: Indicator,
) -> Result<RegionTrend, InsightError> {
    let points = yearly_means(dataset, region, indicator);
    match points.len() {
        0 => return Err(InsightError::NoData { region, indicator }),
        1 => return Err(InsightError::SingleYear { region, indicator }),
        _ => {}
    }

    let (first, last) = (points[0].value, points[points.len() - 1].value);
    let direction = if last > first {
        TrendDirection::Rising
    } else if last < first {
        TrendDirection::Falling
    } else {
        TrendDirection::Flat
    };

    Ok(RegionTrend {
        region,
        indicator,
        points,
        direction,
    })
}
