use serde::Serialize;

use crate::dataset::types::fingerprint_rows;
use crate::dataset::{Indicator, IndicatorRow};
use crate::error::ScoreUnavailable;

/// Scaled value used for every row when a column has no spread.
pub const DEGENERATE_SCALED: f64 = 50.0;

/// Range and median of one indicator column among fully-observed rows.
///
/// Only `fit` builds these, so `min <= median <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnFit {
    min: f64,
    max: f64,
    median: f64,
}

impl ColumnFit {
    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    /// Min-max rescale to [0, 100]. Values outside the fitted range land outside it.
    pub fn scale(&self, value: f64) -> f64 {
        if self.max == self.min {
            return DEGENERATE_SCALED;
        }
        (value - self.min) / (self.max - self.min) * 100.0
    }
}

/// Min-max parameters fit on one dataset snapshot.
///
/// Carries the fingerprint of the rows it was computed from so callers can tell
/// when a snapshot changed underneath them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitParameters {
    columns: [ColumnFit; 4],
    fingerprint: u64,
    observed_rows: usize,
}

/// A row with every indicator rescaled to the fit's [0, 100] range
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRow {
    pub row: IndicatorRow,
    values: [f64; 4],
    scaled: [f64; 4],
    imputed: [bool; 4],
}

impl ScaledRow {
    /// Raw value after median fill
    pub fn value(&self, indicator: Indicator) -> f64 {
        self.values[indicator.index()]
    }

    pub fn scaled(&self, indicator: Indicator) -> f64 {
        self.scaled[indicator.index()]
    }

    pub fn imputed(&self, indicator: Indicator) -> bool {
        self.imputed[indicator.index()]
    }
}

/// Fit min, max and median per indicator over the fully-observed rows.
pub fn fit<R: AsRef<IndicatorRow>>(rows: &[R]) -> Result<FitParameters, ScoreUnavailable> {
    let observed: Vec<&IndicatorRow> = rows
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| r.is_fully_observed())
        .collect();

    if observed.is_empty() {
        return Err(ScoreUnavailable::InsufficientDataForFit);
    }

    let columns = Indicator::ALL.map(|indicator| {
        let mut values: Vec<f64> = observed
            .iter()
            .filter_map(|r| r.get(indicator))
            .collect();
        values.sort_by(f64::total_cmp);
        ColumnFit {
            min: values[0],
            max: values[values.len() - 1],
            median: median_of_sorted(&values),
        }
    });

    Ok(FitParameters {
        columns,
        fingerprint: fingerprint_rows(rows.iter().map(AsRef::as_ref)),
        observed_rows: observed.len(),
    })
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

impl FitParameters {
    pub fn column(&self, indicator: Indicator) -> &ColumnFit {
        &self.columns[indicator.index()]
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of fully-observed rows the fit was computed on
    pub fn observed_rows(&self) -> usize {
        self.observed_rows
    }

    /// True when these parameters were fit on exactly `rows`
    pub fn is_fit_for<R: AsRef<IndicatorRow>>(&self, rows: &[R]) -> bool {
        self.fingerprint == fingerprint_rows(rows.iter().map(AsRef::as_ref))
    }

    /// Fill missing values with the column median, then rescale.
    pub fn transform(&self, row: &IndicatorRow) -> ScaledRow {
        let mut values = [0.0; 4];
        let mut scaled = [0.0; 4];
        let mut imputed = [false; 4];

        for indicator in Indicator::ALL {
            let i = indicator.index();
            let column = self.column(indicator);
            let value = match row.get(indicator) {
                Some(v) => v,
                None => {
                    imputed[i] = true;
                    column.median
                }
            };
            values[i] = value;
            scaled[i] = column.scale(value);
        }

        ScaledRow {
            row: row.clone(),
            values,
            scaled,
            imputed,
        }
    }
}
