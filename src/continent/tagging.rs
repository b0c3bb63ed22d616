use serde::Serialize;
use std::collections::BTreeSet;

use super::label::ContinentLabel;
use crate::dataset::IndicatorRow;
use crate::error::Unresolved;

/// An indicator row that resolved to a continent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedRow {
    #[serde(flatten)]
    pub row: IndicatorRow,
    pub region: ContinentLabel,
}

impl AsRef<IndicatorRow> for TaggedRow {
    fn as_ref(&self) -> &IndicatorRow {
        &self.row
    }
}

/// The cleaned dataset: every row carries exactly one of the seven continent labels.
///
/// Rows whose country could not be resolved never get here, so consumers can rely
/// on `region` without re-validating it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalDataset {
    rows: Vec<TaggedRow>,
}

impl RegionalDataset {
    pub fn from_tagged(rows: Vec<TaggedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TaggedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .map(|t| t.row.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().map(|t| t.row.year).max()
    }

    /// Distinct countries, optionally restricted to one continent
    pub fn countries(&self, region: Option<ContinentLabel>) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|t| region.map_or(true, |r| t.region == r))
            .map(|t| t.row.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn region_of(&self, country: &str) -> Option<ContinentLabel> {
        self.rows
            .iter()
            .find(|t| t.row.country == country)
            .map(|t| t.region)
    }

    /// Rows for one year, optionally restricted to one continent
    pub fn select(&self, year: Option<i32>, region: Option<ContinentLabel>) -> Vec<&TaggedRow> {
        self.rows
            .iter()
            .filter(|t| year.map_or(true, |y| t.row.year == y))
            .filter(|t| region.map_or(true, |r| t.region == r))
            .collect()
    }
}

/// What happened while tagging a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    pub countries_resolved: usize,
    /// Names that could not be resolved, sorted by country
    pub unresolved: Vec<Unresolved>,
}

impl ResolutionReport {
    pub fn rows_dropped(&self) -> usize {
        self.rows_in - self.rows_kept
    }

    pub fn lookup_failures(&self) -> usize {
        self.unresolved.iter().filter(|u| u.is_lookup_failure()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(country: &str, year: i32, region: ContinentLabel) -> TaggedRow {
        TaggedRow {
            row: IndicatorRow::new(country, year),
            region,
        }
    }

    fn sample() -> RegionalDataset {
        RegionalDataset::from_tagged(vec![
            tagged("Kenya", 2019, ContinentLabel::Africa),
            tagged("Kenya", 2020, ContinentLabel::Africa),
            tagged("Chile", 2020, ContinentLabel::SouthAmerica),
            tagged("Ghana", 2020, ContinentLabel::Africa),
        ])
    }

    #[test]
    fn test_select_by_year_and_region() {
        let dataset = sample();
        assert_eq!(dataset.select(Some(2020), None).len(), 3);
        assert_eq!(dataset.select(Some(2020), Some(ContinentLabel::Africa)).len(), 2);
        assert_eq!(dataset.select(None, Some(ContinentLabel::Africa)).len(), 3);
        assert!(dataset.select(Some(1999), None).is_empty());
    }

    #[test]
    fn test_countries_and_years() {
        let dataset = sample();
        assert_eq!(dataset.countries(None), vec!["Chile", "Ghana", "Kenya"]);
        assert_eq!(
            dataset.countries(Some(ContinentLabel::Africa)),
            vec!["Ghana", "Kenya"]
        );
        assert_eq!(dataset.years(), vec![2019, 2020]);
        assert_eq!(dataset.latest_year(), Some(2020));
        assert_eq!(dataset.region_of("Chile"), Some(ContinentLabel::SouthAmerica));
        assert_eq!(dataset.region_of("Peru"), None);
    }

    #[test]
    fn test_report_counts() {
        let report = ResolutionReport {
            rows_in: 10,
            rows_kept: 7,
            countries_resolved: 3,
            unresolved: vec![
                Unresolved::NoMatch("World".into()),
                Unresolved::LookupFailed {
                    name: "Chad".into(),
                    reason: "timeout".into(),
                },
            ],
        };
        assert_eq!(report.rows_dropped(), 3);
        assert_eq!(report.lookup_failures(), 1);
    }
}
