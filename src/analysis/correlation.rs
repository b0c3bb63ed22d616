use serde::Serialize;
use std::fmt;

use crate::continent::{ContinentLabel, RegionalDataset};
use crate::dataset::Indicator;
use crate::error::CorrelationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    /// |r| >= 0.7 is strong, >= 0.4 moderate, anything else weak
    pub fn classify(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

/// Pearson correlation between two indicators plus a plain-language reading of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationInsight {
    pub x: Indicator,
    pub y: Indicator,
    pub year: i32,
    pub region: Option<ContinentLabel>,
    pub pairs: usize,
    pub r: f64,
    pub strength: CorrelationStrength,
    pub direction: Direction,
}

impl CorrelationInsight {
    /// One-paragraph narrative, e.g. for the `correlate` command
    pub fn narrative(&self) -> String {
        let scope = match self.region {
            Some(region) => region.to_string(),
            None => "all regions".to_string(),
        };
        let trend = match self.direction {
            Direction::Positive => "tends to rise",
            Direction::Negative => "tends to fall",
        };
        format!(
            "In {} during {} there is a {} {} relationship between {} and {} (r = {:.2}). \
             As {} increases, {} {}. {}",
            scope,
            self.year,
            self.strength,
            match self.direction {
                Direction::Positive => "positive",
                Direction::Negative => "negative",
            },
            self.x.label(),
            self.y.label(),
            self.r,
            self.x.label().to_lowercase(),
            self.y.label().to_lowercase(),
            trend,
            self.context()
        )
    }

    /// Domain reading of the pair
    pub fn context(&self) -> &'static str {
        let involves = |i: Indicator| self.x == i || self.y == i;
        match self.direction {
            Direction::Negative if involves(Indicator::ChildMortality) => {
                "Higher incomes and better healthcare usually go with fewer child deaths."
            }
            Direction::Positive if involves(Indicator::LifeExpectancy) => {
                "Wealthier nations tend to enjoy longer, healthier lives."
            }
            _ if involves(Indicator::HealthExpPerCapita) => {
                "Healthcare investment tracks economic strength closely."
            }
            _ => "This reflects broader social and economic patterns.",
        }
    }
}

/// Correlate two indicators across countries for one year, optionally within one
/// continent. Rows missing either value are dropped first.
pub fn correlate(
    dataset: &RegionalDataset,
    x: Indicator,
    y: Indicator,
    year: i32,
    region: Option<ContinentLabel>,
) -> Result<CorrelationInsight, CorrelationError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = dataset
        .select(Some(year), region)
        .into_iter()
        .filter_map(|t| Some((t.row.get(x)?, t.row.get(y)?)))
        .unzip();

    let r = pearson(&xs, &ys).map_err(|e| match e {
        PearsonError::TooFew => CorrelationError::NotEnoughData(xs.len()),
        PearsonError::Constant(0) => CorrelationError::NoVariance(x.label().to_string()),
        PearsonError::Constant(_) => CorrelationError::NoVariance(y.label().to_string()),
    })?;

    Ok(CorrelationInsight {
        x,
        y,
        year,
        region,
        pairs: xs.len(),
        r,
        strength: CorrelationStrength::classify(r),
        direction: if r > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        },
    })
}

enum PearsonError {
    TooFew,
    Constant(usize), // which series has zero variance
}

fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, PearsonError> {
    let n = xs.len();
    if n < 2 {
        return Err(PearsonError::TooFew);
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in xs.iter().zip(ys) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 {
        return Err(PearsonError::Constant(0));
    }
    if var_y == 0.0 {
        return Err(PearsonError::Constant(1));
    }
    // rounding can push |r| a hair past 1
    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
