use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::types::{Dataset, Indicator, IndicatorRow};
use crate::continent::RegionalDataset;
use crate::error::DatasetError;

pub const COUNTRY_COLUMN: &str = "Country";
pub const YEAR_COLUMN: &str = "Year";
pub const REGION_COLUMN: &str = "Region";

/// Years outside this window are kept but logged; they usually mean a bad merge.
const EXPECTED_YEARS: std::ops::RangeInclusive<i32> = 2000..=2035;

/// Load an indicator table from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_dataset(file, &path.display().to_string())
}

/// Read an indicator table from any CSV source.
///
/// Numeric cells are coerced: blanks, "nan", "None", World Bank's ".." and anything
/// unparseable become missing values. Rows whose year cannot be read are dropped.
/// Extra columns (a stale `Region`, `Country_Code`, ...) are ignored.
pub fn read_dataset<R: Read>(reader: R, source_name: &str) -> Result<Dataset, DatasetError> {
    let csv_err = |source| DatasetError::Csv {
        path: source_name.to_string(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let missing = |column: &str| DatasetError::MissingColumn {
        path: source_name.to_string(),
        column: column.to_string(),
    };
    let country_idx = position(COUNTRY_COLUMN).ok_or_else(|| missing(COUNTRY_COLUMN))?;
    let year_idx = position(YEAR_COLUMN).ok_or_else(|| missing(YEAR_COLUMN))?;

    let indicator_idx: Vec<(Indicator, Option<usize>)> = Indicator::ALL
        .iter()
        .map(|&ind| (ind, position(ind.column())))
        .collect();
    for (indicator, idx) in &indicator_idx {
        if idx.is_none() {
            warn!(
                "{}: column '{}' not present, treating it as missing",
                source_name,
                indicator.column()
            );
        }
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for record in rdr.records() {
        let record = record.map_err(csv_err)?;

        let country = record.get(country_idx).unwrap_or_default();
        if country.is_empty() {
            dropped += 1;
            continue;
        }

        let Some(year) = record.get(year_idx).and_then(parse_year) else {
            dropped += 1;
            continue;
        };
        if !EXPECTED_YEARS.contains(&year) {
            debug!("{}: {} has out-of-range year {}", source_name, country, year);
        }

        let mut row = IndicatorRow::new(country, year);
        for (indicator, idx) in &indicator_idx {
            let value = idx.and_then(|i| record.get(i)).and_then(parse_number);
            row.set(*indicator, value);
        }
        rows.push(row);
    }

    if dropped > 0 {
        debug!("{}: dropped {} rows without country or year", source_name, dropped);
    }

    let raw_count = rows.len();
    let dataset = Dataset::from_rows(rows);
    debug!(
        "{}: {} rows read, {} after merging duplicate (country, year) keys",
        source_name,
        raw_count,
        dataset.len()
    );

    Ok(dataset)
}

/// Coerce a cell to a number, treating every sentinel as missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell == ".." {
        return None;
    }
    match cell.to_ascii_lowercase().as_str() {
        "nan" | "none" | "null" | "na" => return None,
        _ => {}
    }
    cell.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Years arrive as "2010" or, after a float round-trip, "2010.0".
fn parse_year(cell: &str) -> Option<i32> {
    let value = parse_number(cell)?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value as i32)
}

/// Write the cleaned, continent-tagged table atomically.
///
/// Missing indicator values are written as empty cells.
pub fn save_regional_dataset(path: &Path, dataset: &RegionalDataset) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    {
        let mut writer = csv::Writer::from_writer(&mut file);

        let mut header = vec![COUNTRY_COLUMN, YEAR_COLUMN];
        header.extend(Indicator::ALL.iter().map(|i| i.column()));
        header.push(REGION_COLUMN);
        writer.write_record(&header).context("Failed to write CSV header")?;

        for tagged in dataset.rows() {
            let mut record = vec![tagged.row.country.clone(), tagged.row.year.to_string()];
            record.extend(
                Indicator::ALL
                    .iter()
                    .map(|&i| tagged.row.get(i).map(|v| v.to_string()).unwrap_or_default()),
            );
            record.push(tagged.region.to_string());
            writer
                .write_record(&record)
                .with_context(|| format!("Failed to write row for {}", tagged.row.country))?;
        }

        writer.flush().context("Failed to flush CSV writer")?;
    }

    file.commit()
        .with_context(|| format!("Failed to save cleaned dataset to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::{ContinentLabel, TaggedRow};
    use std::env;

    const SAMPLE: &str = "\
Country,Country_Code,Year,GDP_per_capita,Life_Expectancy,Health_Exp_per_Capita,Child_Mortality
India,IND,2015,1590.2,68.6,63.1,43.0
India,IND,2015,,,,
Brazil,BRA,2015.0,8750.2,74.9,,16.4
Euro area,EMU,2015,nan,81.5,..,3.9
Nowhere,XXX,not-a-year,1,2,3,4
";

    #[test]
    fn test_reads_and_coerces() {
        let dataset = read_dataset(SAMPLE.as_bytes(), "sample").unwrap();

        // duplicate India row merged, bad year dropped
        assert_eq!(dataset.len(), 3);

        let brazil = dataset.rows().iter().find(|r| r.country == "Brazil").unwrap();
        assert_eq!(brazil.year, 2015);
        assert_eq!(brazil.health_exp_per_capita, None);
        assert_eq!(brazil.child_mortality, Some(16.4));

        let euro = dataset.rows().iter().find(|r| r.country == "Euro area").unwrap();
        assert_eq!(euro.gdp_per_capita, None);
        assert_eq!(euro.health_exp_per_capita, None);
        assert_eq!(euro.life_expectancy, Some(81.5));
    }

    #[test]
    fn test_missing_country_column_is_error() {
        let csv = "Nation,Year\nFrance,2010\n";
        let err = read_dataset(csv.as_bytes(), "bad").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn { ref column, .. } if column == "Country"));
    }

    #[test]
    fn test_missing_indicator_column_tolerated() {
        let csv = "Country,Year,GDP_per_capita\nFrance,2010,40000\n";
        let dataset = read_dataset(csv.as_bytes(), "partial").unwrap();
        assert_eq!(dataset.rows()[0].gdp_per_capita, Some(40_000.0));
        assert_eq!(dataset.rows()[0].child_mortality, None);
    }

    #[test]
    fn test_parse_number_sentinels() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(".."), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number(" 42 "), Some(42.0));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("soon"), None);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = env::temp_dir().join("wealth_atlas_test_does_not_exist.csv");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(load_dataset(&path), Err(DatasetError::Io { .. })));
    }

    #[test]
    fn test_save_then_load_keeps_rows() {
        let path = env::temp_dir().join("wealth_atlas_test_cleaned.csv");
        let _ = std::fs::remove_file(&path);

        let dataset = RegionalDataset::from_tagged(vec![TaggedRow {
            row: IndicatorRow::new("Chile", 2018)
                .with(Indicator::GdpPerCapita, 15_000.0)
                .with(Indicator::ChildMortality, 7.0),
            region: ContinentLabel::SouthAmerica,
        }]);
        save_regional_dataset(&path, &dataset).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().next().unwrap().ends_with(",Region"));
        assert!(contents.contains("Chile,2018,15000,,,7,South America"));

        let reloaded = load_dataset(&path).unwrap();
        assert_eq!(reloaded.rows()[0].gdp_per_capita, Some(15_000.0));
        assert_eq!(reloaded.rows()[0].life_expectancy, None);

        let _ = std::fs::remove_file(&path);
    }
}
