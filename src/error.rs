use thiserror::Error;

use crate::continent::ContinentLabel;
use crate::dataset::Indicator;

/// Why a country name could not be mapped to a continent.
///
/// Both variants mean the same thing to the caller: the row is dropped from the
/// cleaned dataset. They are kept apart so the clean report can say how many names
/// the classifier simply did not know versus how many lookups failed outright.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    #[error("no continent found for '{0}'")]
    NoMatch(String),
    #[error("continent lookup failed for '{name}': {reason}")]
    LookupFailed { name: String, reason: String },
}

impl Unresolved {
    pub fn country(&self) -> &str {
        match self {
            Unresolved::NoMatch(name) => name,
            Unresolved::LookupFailed { name, .. } => name,
        }
    }

    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Unresolved::LookupFailed { .. })
    }
}

/// Why a progress score could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreUnavailable {
    /// No row in the snapshot has all four indicators, so no fit exists.
    #[error("no fully-observed rows to fit the indicator ranges on")]
    InsufficientDataForFit,
    #[error("no data for country '{0}'")]
    CountryNotFound(String),
}

/// Failures while reading or writing an indicator table.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("dataset {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },
}

/// Why a correlation could not be computed for the selected rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("need at least 2 rows with both indicators, found {0}")]
    NotEnoughData(usize),
    #[error("'{0}' does not vary across the selected rows")]
    NoVariance(String),
}

/// Why a continent-level insight could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    #[error("no {indicator} data for {region}")]
    NoData {
        region: ContinentLabel,
        indicator: Indicator,
    },
    #[error("{region} has {indicator} data for a single year only, no trend to report")]
    SingleYear {
        region: ContinentLabel,
        indicator: Indicator,
    },
    #[error("cannot compare {0} with itself")]
    SameRegion(ContinentLabel),
}
