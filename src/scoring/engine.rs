use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use super::config::Weights;
use super::fit::{fit, FitParameters};
use crate::dataset::{Indicator, IndicatorRow};
use crate::error::ScoreUnavailable;

/// One indicator's share of a progress score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Component {
    pub raw: f64,      // value after median fill
    pub scaled: f64,   // 0-100 within the fitted range
    pub weight: f64,
    pub contribution: f64,
    pub imputed: bool, // raw came from the column median
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub country: String,
    pub requested_year: i32,
    /// Year the score was computed for; the latest available when `requested_year` had no row
    pub year: i32,
    pub score: f64,
    pub components: BTreeMap<Indicator, Component>,
}

impl ScoreBreakdown {
    pub fn component(&self, indicator: Indicator) -> Option<&Component> {
        self.components.get(&indicator)
    }

    pub fn used_fallback_year(&self) -> bool {
        self.year != self.requested_year
    }

    pub fn imputed_count(&self) -> usize {
        self.components.values().filter(|c| c.imputed).count()
    }
}

/// Composite progress score for one country.
///
/// Picks the exact (country, year) row, else the country's most recent year.
/// Child mortality contributes `(100 - scaled) * w`, every other indicator
/// `scaled * w`. The sum is returned as is, so rows outside the fitted range can
/// score below 0 or above 100.
pub fn score<R: AsRef<IndicatorRow>>(
    country: &str,
    year: i32,
    rows: &[R],
    fit: &FitParameters,
    weights: &Weights,
) -> Result<ScoreBreakdown, ScoreUnavailable> {
    let row = select_row(country, year, rows)
        .ok_or_else(|| ScoreUnavailable::CountryNotFound(country.to_string()))?;

    if row.year != year {
        debug!(
            "No {} row for {}, scoring latest available year {}",
            year, country, row.year
        );
    }

    let scaled = fit.transform(row);
    let mut components = BTreeMap::new();
    let mut total = 0.0;

    for indicator in Indicator::ALL {
        let weight = weights.get(indicator);
        let value = scaled.scaled(indicator);
        let contribution = if indicator.higher_is_better() {
            value * weight
        } else {
            (100.0 - value) * weight
        };
        total += contribution;

        components.insert(
            indicator,
            Component {
                raw: scaled.value(indicator),
                scaled: value,
                weight,
                contribution,
                imputed: scaled.imputed(indicator),
            },
        );
    }

    Ok(ScoreBreakdown {
        country: country.to_string(),
        requested_year: year,
        year: row.year,
        score: total,
        components,
    })
}

fn select_row<'a, R: AsRef<IndicatorRow>>(
    country: &str,
    year: i32,
    rows: &'a [R],
) -> Option<&'a IndicatorRow> {
    let mut latest: Option<&IndicatorRow> = None;
    for row in rows.iter().map(AsRef::as_ref) {
        if row.country != country {
            continue;
        }
        if row.year == year {
            return Some(row);
        }
        if latest.map_or(true, |l| row.year > l.year) {
            latest = Some(row);
        }
    }
    latest
}

/// Scores countries against one snapshot.
///
/// Borrowing the rows ties the fit to the snapshot it was computed on; a new
/// snapshot needs a new scorer.
pub struct ProgressScorer<'a, R> {
    rows: &'a [R],
    fit: Result<FitParameters, ScoreUnavailable>,
    weights: Weights,
}

impl<'a, R: AsRef<IndicatorRow>> ProgressScorer<'a, R> {
    pub fn new(rows: &'a [R], weights: Weights) -> Self {
        let fit = fit(rows);
        match &fit {
            Ok(params) => debug!(
                "Fit scoring ranges on {} fully-observed rows",
                params.observed_rows()
            ),
            Err(e) => debug!("Scoring unavailable for this snapshot: {}", e),
        }
        Self { rows, fit, weights }
    }

    pub fn fit(&self) -> Result<&FitParameters, ScoreUnavailable> {
        self.fit.as_ref().map_err(Clone::clone)
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn score(&self, country: &str, year: i32) -> Result<ScoreBreakdown, ScoreUnavailable> {
        score(country, year, self.rows, self.fit()?, &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(country: &str, year: i32, values: [f64; 4]) -> IndicatorRow {
        IndicatorRow::new(country, year)
            .with(Indicator::GdpPerCapita, values[0])
            .with(Indicator::LifeExpectancy, values[1])
            .with(Indicator::HealthExpPerCapita, values[2])
            .with(Indicator::ChildMortality, values[3])
    }

    /// A is worst on every indicator, B best.
    fn two_countries() -> Vec<IndicatorRow> {
        vec![
            full("A", 2020, [1_000.0, 50.0, 100.0, 80.0]),
            full("B", 2020, [50_000.0, 85.0, 5_000.0, 5.0]),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_extremes_score_zero_and_hundred() {
        let rows = two_countries();
        let scorer = ProgressScorer::new(&rows, Weights::default());

        let a = scorer.score("A", 2020).unwrap();
        let b = scorer.score("B", 2020).unwrap();

        assert!(approx(a.score, 0.0), "A scored {}", a.score);
        assert!(approx(b.score, 100.0), "B scored {}", b.score);

        let mortality = b.component(Indicator::ChildMortality).unwrap();
        assert!(approx(mortality.scaled, 0.0));
        assert!(approx(mortality.contribution, 10.0));
    }

    #[test]
    fn test_components_sum_to_score() {
        let mut rows = two_countries();
        rows.push(full("C", 2020, [13_000.0, 71.0, 1_260.0, 33.0]));
        let scorer = ProgressScorer::new(&rows, Weights::default());

        let c = scorer.score("C", 2020).unwrap();
        let sum: f64 = c.components.values().map(|comp| comp.contribution).sum();
        assert!(approx(c.score, sum));
        assert_eq!(c.components.len(), 4);
    }

    #[test]
    fn test_median_fill_keeps_partial_row_scorable() {
        let mut rows = two_countries();
        rows.push(
            IndicatorRow::new("C", 2020)
                .with(Indicator::LifeExpectancy, 67.5)
                .with(Indicator::HealthExpPerCapita, 2_550.0)
                .with(Indicator::ChildMortality, 42.5),
        );
        let scorer = ProgressScorer::new(&rows, Weights::default());

        let c = scorer.score("C", 2020).unwrap();
        assert_eq!(c.imputed_count(), 1);
        let gdp = c.component(Indicator::GdpPerCapita).unwrap();
        assert!(gdp.imputed);
        assert_eq!(gdp.raw, 25_500.0);
        // every indicator sits at the midpoint of its range
        assert!(approx(c.score, 50.0));
    }

    #[test]
    fn test_child_mortality_is_linear_and_inverted() {
        let rows = two_countries();
        let fit = fit(&rows).unwrap();
        let weights = Weights::default();

        let base = full("C", 2020, [20_000.0, 65.0, 300.0, 40.0]);
        let worse = full("C", 2020, [20_000.0, 65.0, 300.0, 55.0]);

        let base_score = score("C", 2020, &[base.clone()], &fit, &weights).unwrap();
        let worse_score = score("C", 2020, &[worse], &fit, &weights).unwrap();

        let delta_scaled = worse_score.components[&Indicator::ChildMortality].scaled
            - base_score.components[&Indicator::ChildMortality].scaled;
        assert!(approx(delta_scaled, 20.0));
        assert!(approx(
            worse_score.score - base_score.score,
            -delta_scaled * 0.1
        ));
    }

    #[test]
    fn test_falls_back_to_latest_year() {
        let mut rows = two_countries();
        rows.push(full("A", 2018, [900.0, 48.0, 90.0, 95.0]));
        rows.push(full("A", 2021, [1_100.0, 51.0, 120.0, 75.0]));
        let scorer = ProgressScorer::new(&rows, Weights::default());

        let breakdown = scorer.score("A", 2030).unwrap();
        assert_eq!(breakdown.year, 2021);
        assert_eq!(breakdown.requested_year, 2030);
        assert!(breakdown.used_fallback_year());

        let exact = scorer.score("A", 2018).unwrap();
        assert_eq!(exact.year, 2018);
        assert!(!exact.used_fallback_year());
    }

    #[test]
    fn test_nan_row_does_not_spoil_the_snapshot() {
        let mut rows = two_countries();
        let mut c = full("C", 2020, [20_000.0, 60.0, 200.0, 40.0]);
        c.gdp_per_capita = Some(f64::NAN);
        rows.push(c);
        let scorer = ProgressScorer::new(&rows, Weights::default());

        assert_eq!(scorer.fit().unwrap().observed_rows(), 2);
        let b = scorer.score("B", 2020).unwrap();
        assert!(approx(b.score, 100.0), "B scored {}", b.score);

        let c = scorer.score("C", 2020).unwrap();
        assert!(c.score.is_finite());
        assert!(c.component(Indicator::GdpPerCapita).unwrap().imputed);
    }

    #[test]
    fn test_unknown_country() {
        let rows = two_countries();
        let scorer = ProgressScorer::new(&rows, Weights::default());
        assert_eq!(
            scorer.score("Atlantis", 2020),
            Err(ScoreUnavailable::CountryNotFound("Atlantis".into()))
        );
    }

    #[test]
    fn test_no_fit_is_unavailable() {
        let rows = vec![IndicatorRow::new("A", 2020).with(Indicator::GdpPerCapita, 1.0)];
        let scorer = ProgressScorer::new(&rows, Weights::default());
        assert_eq!(
            scorer.score("A", 2020),
            Err(ScoreUnavailable::InsufficientDataForFit)
        );
    }

    #[test]
    fn test_custom_weights() {
        let rows = two_countries();
        let gdp_only = Weights {
            gdp_per_capita: 1.0,
            life_expectancy: 0.0,
            health_exp_per_capita: 0.0,
            child_mortality: 0.0,
        };
        let fit = fit(&rows).unwrap();
        let mid = full("C", 2020, [13_250.0, 85.0, 5_000.0, 5.0]);

        let breakdown = score("C", 2020, &[mid], &fit, &gdp_only).unwrap();
        assert!(approx(breakdown.score, 25.0));
    }

    #[test]
    fn test_breakdown_serializes_with_indicator_keys() {
        let rows = two_countries();
        let scorer = ProgressScorer::new(&rows, Weights::default());
        let breakdown = scorer.score("B", 2020).unwrap();

        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json["components"]["gdp_per_capita"]["weight"].is_number());
        assert!(json["components"]["child_mortality"]["contribution"].is_number());
    }
}
