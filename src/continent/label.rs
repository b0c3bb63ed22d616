use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of continent tags used throughout the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContinentLabel {
    Asia,
    Africa,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Australia,
    Antarctica,
}

/// Strings some classifiers emit instead of admitting they found nothing.
const SENTINELS: &[&str] = &["Other", "Not Found", "None", "nan", "America", ""];

impl ContinentLabel {
    /// All labels in canonical display order
    pub const ALL: [ContinentLabel; 7] = [
        ContinentLabel::Asia,
        ContinentLabel::Africa,
        ContinentLabel::Europe,
        ContinentLabel::NorthAmerica,
        ContinentLabel::SouthAmerica,
        ContinentLabel::Australia,
        ContinentLabel::Antarctica,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContinentLabel::Asia => "Asia",
            ContinentLabel::Africa => "Africa",
            ContinentLabel::Europe => "Europe",
            ContinentLabel::NorthAmerica => "North America",
            ContinentLabel::SouthAmerica => "South America",
            ContinentLabel::Australia => "Australia",
            ContinentLabel::Antarctica => "Antarctica",
        }
    }

    /// Antarctica stays in the taxonomy so every consumer sees seven tags, but no
    /// country ever resolves there.
    pub fn is_vestigial(self) -> bool {
        matches!(self, ContinentLabel::Antarctica)
    }

    /// Strict parse of one of the seven label names.
    ///
    /// Sentinels ("Other", "Not Found", "None", "nan", "America") and anything else
    /// outside the closed set yield `None`.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        if SENTINELS.iter().any(|sentinel| sentinel.eq_ignore_ascii_case(s)) {
            return None;
        }
        ContinentLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ContinentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContinentLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContinentLabel::from_label(s).ok_or_else(|| {
            anyhow::anyhow!(
                "'{}' is not a continent (expected one of: {})",
                s,
                ContinentLabel::ALL.map(|l| l.as_str()).join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_labels() {
        for label in ContinentLabel::ALL {
            assert_eq!(ContinentLabel::from_label(label.as_str()), Some(label));
            assert_eq!(label.to_string().parse::<ContinentLabel>().unwrap(), label);
        }
    }

    #[test]
    fn test_sentinels_rejected() {
        for s in ["Other", "Not Found", "None", "nan", "NaN", "America", "", "  "] {
            assert_eq!(ContinentLabel::from_label(s), None, "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_outside_closed_set_rejected() {
        assert_eq!(ContinentLabel::from_label("Oceania"), None);
        assert_eq!(ContinentLabel::from_label("Americas"), None);
        assert_eq!(ContinentLabel::from_label("Eurasia"), None);
    }

    #[test]
    fn test_only_antarctica_is_vestigial() {
        let vestigial: Vec<_> = ContinentLabel::ALL
            .into_iter()
            .filter(|l| l.is_vestigial())
            .collect();
        assert_eq!(vestigial, vec![ContinentLabel::Antarctica]);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&ContinentLabel::NorthAmerica).unwrap();
        assert_eq!(json, "\"North America\"");
        let parsed: ContinentLabel = serde_json::from_str("\"South America\"").unwrap();
        assert_eq!(parsed, ContinentLabel::SouthAmerica);
    }
}
