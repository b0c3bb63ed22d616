use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The four tracked World Bank indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    GdpPerCapita,
    LifeExpectancy,
    HealthExpPerCapita,
    ChildMortality,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::GdpPerCapita,
        Indicator::LifeExpectancy,
        Indicator::HealthExpPerCapita,
        Indicator::ChildMortality,
    ];

    /// Column header used in the dataset CSV
    pub fn column(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP_per_capita",
            Indicator::LifeExpectancy => "Life_Expectancy",
            Indicator::HealthExpPerCapita => "Health_Exp_per_Capita",
            Indicator::ChildMortality => "Child_Mortality",
        }
    }

    /// Key used in config files and JSON output
    pub fn key(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "gdp_per_capita",
            Indicator::LifeExpectancy => "life_expectancy",
            Indicator::HealthExpPerCapita => "health_exp_per_capita",
            Indicator::ChildMortality => "child_mortality",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Indicator::GdpPerCapita => "GDP per capita",
            Indicator::LifeExpectancy => "Life expectancy",
            Indicator::HealthExpPerCapita => "Health expenditure per capita",
            Indicator::ChildMortality => "Child mortality",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Indicator::GdpPerCapita => 0,
            Indicator::LifeExpectancy => 1,
            Indicator::HealthExpPerCapita => 2,
            Indicator::ChildMortality => 3,
        }
    }

    /// Child mortality is the only indicator where lower values mean progress.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Indicator::ChildMortality)
    }

    /// Parse a column header, config key, or short alias ("gdp", "life", "health", "mortality")
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        for indicator in Indicator::ALL {
            if normalized == indicator.key() || normalized == indicator.column().to_ascii_lowercase()
            {
                return Ok(indicator);
            }
        }
        match normalized.as_str() {
            "gdp" => Ok(Indicator::GdpPerCapita),
            "life" | "life_exp" => Ok(Indicator::LifeExpectancy),
            "health" | "health_exp" => Ok(Indicator::HealthExpPerCapita),
            "mortality" | "child" => Ok(Indicator::ChildMortality),
            _ => bail!(
                "Unknown indicator '{}' (expected one of gdp, life, health, mortality)",
                s
            ),
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (country, year) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub country: String,
    pub year: i32,
    pub gdp_per_capita: Option<f64>,
    pub life_expectancy: Option<f64>,
    pub health_exp_per_capita: Option<f64>,
    pub child_mortality: Option<f64>,
}

impl IndicatorRow {
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
            gdp_per_capita: None,
            life_expectancy: None,
            health_exp_per_capita: None,
            child_mortality: None,
        }
    }

    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        self.set(indicator, Some(value));
        self
    }

    /// Observed value; NaN and infinities read as missing.
    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        let value = match indicator {
            Indicator::GdpPerCapita => self.gdp_per_capita,
            Indicator::LifeExpectancy => self.life_expectancy,
            Indicator::HealthExpPerCapita => self.health_exp_per_capita,
            Indicator::ChildMortality => self.child_mortality,
        };
        value.filter(|v| v.is_finite())
    }

    /// Store a value. Non-finite values are stored as missing.
    pub fn set(&mut self, indicator: Indicator, value: Option<f64>) {
        let slot = match indicator {
            Indicator::GdpPerCapita => &mut self.gdp_per_capita,
            Indicator::LifeExpectancy => &mut self.life_expectancy,
            Indicator::HealthExpPerCapita => &mut self.health_exp_per_capita,
            Indicator::ChildMortality => &mut self.child_mortality,
        };
        *slot = value.filter(|v| v.is_finite());
    }

    /// True when all four indicators are present
    pub fn is_fully_observed(&self) -> bool {
        Indicator::ALL.iter().all(|&i| self.get(i).is_some())
    }

    /// Fill gaps in `self` from `other`; values already present are kept.
    pub fn merge_missing(&mut self, other: &IndicatorRow) {
        for indicator in Indicator::ALL {
            if self.get(indicator).is_none() {
                self.set(indicator, other.get(indicator));
            }
        }
    }
}

impl AsRef<IndicatorRow> for IndicatorRow {
    fn as_ref(&self) -> &IndicatorRow {
        self
    }
}

/// An immutable snapshot of indicator rows, deduplicated on (country, year).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<IndicatorRow>,
}

impl Dataset {
    /// Build a snapshot, merging duplicate (country, year) rows.
    ///
    /// The first row seen for a key keeps its values; later duplicates only fill
    /// indicators the first one was missing. Input order is otherwise preserved.
    pub fn from_rows(rows: Vec<IndicatorRow>) -> Self {
        let mut positions: HashMap<(String, i32), usize> = HashMap::new();
        let mut deduped: Vec<IndicatorRow> = Vec::with_capacity(rows.len());

        for row in rows {
            let key = (row.country.clone(), row.year);
            match positions.get(&key) {
                Some(&idx) => deduped[idx].merge_missing(&row),
                None => {
                    positions.insert(key, deduped.len());
                    deduped.push(row);
                }
            }
        }

        Self { rows: deduped }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct country names in sorted order
    pub fn countries(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().map(|r| r.year).max()
    }

    /// Stable identity of this snapshot's contents.
    ///
    /// Used to invalidate resolution caches and to tie fit parameters to the rows
    /// they were computed from.
    pub fn fingerprint(&self) -> u64 {
        fingerprint_rows(&self.rows)
    }
}

pub(crate) fn fingerprint_rows<'a, I>(rows: I) -> u64
where
    I: IntoIterator<Item = &'a IndicatorRow>,
{
    let mut hasher = DefaultHasher::new();
    for row in rows {
        row.country.hash(&mut hasher);
        row.year.hash(&mut hasher);
        for indicator in Indicator::ALL {
            row.get(indicator).map(f64::to_bits).hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_parse_aliases() {
        assert_eq!(Indicator::parse("gdp").unwrap(), Indicator::GdpPerCapita);
        assert_eq!(Indicator::parse("Life_Expectancy").unwrap(), Indicator::LifeExpectancy);
        assert_eq!(
            Indicator::parse("health-exp-per-capita").unwrap(),
            Indicator::HealthExpPerCapita
        );
        assert_eq!(Indicator::parse("mortality").unwrap(), Indicator::ChildMortality);
        assert!(Indicator::parse("population").is_err());
    }

    #[test]
    fn test_only_child_mortality_is_inverted() {
        let inverted: Vec<_> = Indicator::ALL
            .iter()
            .filter(|i| !i.higher_is_better())
            .collect();
        assert_eq!(inverted, vec![&Indicator::ChildMortality]);
    }

    #[test]
    fn test_fully_observed() {
        let row = IndicatorRow::new("Chile", 2015)
            .with(Indicator::GdpPerCapita, 13_000.0)
            .with(Indicator::LifeExpectancy, 79.0)
            .with(Indicator::HealthExpPerCapita, 1_100.0);
        assert!(!row.is_fully_observed());

        let row = row.with(Indicator::ChildMortality, 7.5);
        assert!(row.is_fully_observed());
    }

    #[test]
    fn test_non_finite_values_are_missing() {
        let row = IndicatorRow::new("Chile", 2015)
            .with(Indicator::GdpPerCapita, f64::NAN)
            .with(Indicator::LifeExpectancy, f64::INFINITY)
            .with(Indicator::HealthExpPerCapita, 1_100.0)
            .with(Indicator::ChildMortality, 7.5);
        assert_eq!(row.gdp_per_capita, None);
        assert_eq!(row.get(Indicator::LifeExpectancy), None);
        assert!(!row.is_fully_observed());

        // written straight into the public field
        let mut row = row.with(Indicator::GdpPerCapita, 13_000.0);
        row.life_expectancy = Some(f64::NAN);
        assert_eq!(row.get(Indicator::LifeExpectancy), None);
        assert!(!row.is_fully_observed());
    }

    #[test]
    fn test_dedup_keeps_first_and_fills_gaps() {
        let first = IndicatorRow::new("Kenya", 2012).with(Indicator::GdpPerCapita, 1_100.0);
        let second = IndicatorRow::new("Kenya", 2012)
            .with(Indicator::GdpPerCapita, 9_999.0)
            .with(Indicator::ChildMortality, 55.0);
        let other_year = IndicatorRow::new("Kenya", 2013);

        let dataset = Dataset::from_rows(vec![first, second, other_year]);

        assert_eq!(dataset.len(), 2);
        let merged = &dataset.rows()[0];
        assert_eq!(merged.gdp_per_capita, Some(1_100.0));
        assert_eq!(merged.child_mortality, Some(55.0));
    }

    #[test]
    fn test_countries_sorted_and_distinct() {
        let dataset = Dataset::from_rows(vec![
            IndicatorRow::new("Peru", 2010),
            IndicatorRow::new("Chile", 2010),
            IndicatorRow::new("Peru", 2011),
        ]);
        assert_eq!(dataset.countries(), vec!["Chile", "Peru"]);
        assert_eq!(dataset.latest_year(), Some(2011));
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let a = Dataset::from_rows(vec![IndicatorRow::new("Peru", 2010)]);
        let b = Dataset::from_rows(vec![IndicatorRow::new("Peru", 2010)]);
        let c = Dataset::from_rows(vec![
            IndicatorRow::new("Peru", 2010).with(Indicator::GdpPerCapita, 1.0)
        ]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
