use serde::Serialize;
use std::collections::BTreeSet;

use crate::continent::{ContinentLabel, RegionalDataset};
use crate::dataset::Indicator;

/// Indicator averages for one continent in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentSummary {
    pub region: ContinentLabel,
    pub countries: usize,
    /// Kept for a complete continent list; no country resolves here
    pub vestigial: bool,
    /// Mean per indicator in `Indicator::ALL` order; `None` when no country reported it
    pub means: [Option<f64>; 4],
}

impl ContinentSummary {
    pub fn mean(&self, indicator: Indicator) -> Option<f64> {
        self.means[indicator.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub year: i32,
    pub rows: Vec<ContinentSummary>,
}

/// Per-continent indicator means for `year` (the latest year when `None`).
///
/// Every label appears, in canonical order, even with zero countries. Missing
/// values are skipped rather than counted as zero. Returns `None` for an empty
/// dataset.
pub fn summarize(dataset: &RegionalDataset, year: Option<i32>) -> Option<SummaryTable> {
    let year = year.or_else(|| dataset.latest_year())?;
    let selected = dataset.select(Some(year), None);

    let rows = ContinentLabel::ALL
        .iter()
        .map(|&region| {
            let members: Vec<_> = selected.iter().filter(|t| t.region == region).collect();
            let countries = members
                .iter()
                .map(|t| t.row.country.as_str())
                .collect::<BTreeSet<_>>()
                .len();
            let means = Indicator::ALL.map(|indicator| {
                mean(members.iter().filter_map(|t| t.row.get(indicator)))
            });
            ContinentSummary {
                region,
                countries,
                vestigial: region.is_vestigial(),
                means,
            }
        })
        .collect();

    Some(SummaryTable { year, rows })
}

pub(super) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::TaggedRow;
    use crate::dataset::IndicatorRow;

    fn tagged(row: IndicatorRow, region: ContinentLabel) -> TaggedRow {
        TaggedRow { row, region }
    }

    fn sample() -> RegionalDataset {
        RegionalDataset::from_tagged(vec![
            tagged(
                IndicatorRow::new("Kenya", 2020)
                    .with(Indicator::GdpPerCapita, 2_000.0)
                    .with(Indicator::ChildMortality, 40.0),
                ContinentLabel::Africa,
            ),
            tagged(
                IndicatorRow::new("Ghana", 2020).with(Indicator::GdpPerCapita, 2_400.0),
                ContinentLabel::Africa,
            ),
            tagged(
                IndicatorRow::new("Ghana", 2019).with(Indicator::GdpPerCapita, 9_999.0),
                ContinentLabel::Africa,
            ),
            tagged(
                IndicatorRow::new("Chile", 2020).with(Indicator::LifeExpectancy, 80.0),
                ContinentLabel::SouthAmerica,
            ),
        ])
    }

    #[test]
    fn test_lists_every_continent_in_order() {
        let table = summarize(&sample(), Some(2020)).unwrap();
        let regions: Vec<_> = table.rows.iter().map(|r| r.region).collect();
        assert_eq!(regions, ContinentLabel::ALL.to_vec());

        let antarctica = table.rows.last().unwrap();
        assert_eq!(antarctica.region, ContinentLabel::Antarctica);
        assert_eq!(antarctica.countries, 0);
        assert!(antarctica.vestigial);
        assert_eq!(table.rows.iter().filter(|r| r.vestigial).count(), 1);
        assert_eq!(antarctica.mean(Indicator::GdpPerCapita), None);
    }

    #[test]
    fn test_means_skip_missing_values() {
        let table = summarize(&sample(), Some(2020)).unwrap();
        let africa = table
            .rows
            .iter()
            .find(|r| r.region == ContinentLabel::Africa)
            .unwrap();

        assert_eq!(africa.countries, 2);
        assert_eq!(africa.mean(Indicator::GdpPerCapita), Some(2_200.0));
        // only Kenya reported it
        assert_eq!(africa.mean(Indicator::ChildMortality), Some(40.0));
        assert_eq!(africa.mean(Indicator::LifeExpectancy), None);
    }

    #[test]
    fn test_defaults_to_latest_year() {
        let table = summarize(&sample(), None).unwrap();
        assert_eq!(table.year, 2020);
    }

    #[test]
    fn test_vestigial_flag_in_json() {
        let table = summarize(&sample(), Some(2020)).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows[6]["region"], "Antarctica");
        assert_eq!(rows[6]["vestigial"], true);
        assert_eq!(rows[0]["vestigial"], false);
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(summarize(&RegionalDataset::default(), None), None);
    }
}
