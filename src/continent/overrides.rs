use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::label::ContinentLabel;

pub const OVERRIDE_TABLE_VERSION: u32 = 1;

/// Manual country → continent assignments that win over any classifier.
///
/// Matching is exact and case-sensitive on the name as it appears in the source
/// data. The table is plain configuration: different deployments can pin
/// geopolitically ambiguous countries (Russia, Turkey, ...) differently without
/// touching resolution logic.
///
/// Example YAML:
/// ```yaml
/// overrides:
///   version: 1
///   continents:
///     Asia: ["Russia", "Turkey"]
///     North America: ["United States", "Canada", "Mexico"]
///   north_america: ["Guatemala", "Jamaica"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OverrideTable {
    pub version: u32,

    #[serde(default)]
    pub continents: BTreeMap<ContinentLabel, Vec<String>>,

    /// Extra names treated as North American when the classifier answers "Americas".
    /// Names under `continents["North America"]` always count as well.
    #[serde(default)]
    pub north_america: Vec<String>,
}

impl Default for OverrideTable {
    fn default() -> Self {
        let entries: [(ContinentLabel, &[&str]); 7] = [
            (
                ContinentLabel::Asia,
                &[
                    "China",
                    "India",
                    "Japan",
                    "Russia",
                    "Saudi Arabia",
                    "South Korea",
                    "Indonesia",
                    "Turkey",
                    "Iran",
                    "Pakistan",
                    "Thailand",
                    "Malaysia",
                ],
            ),
            (
                ContinentLabel::Africa,
                &[
                    "Nigeria",
                    "Egypt",
                    "South Africa",
                    "Kenya",
                    "Ethiopia",
                    "Ghana",
                    "Algeria",
                    "Morocco",
                    "Tunisia",
                ],
            ),
            (
                ContinentLabel::Europe,
                &[
                    "France",
                    "Germany",
                    "United Kingdom",
                    "Italy",
                    "Spain",
                    "Netherlands",
                    "Poland",
                    "Sweden",
                    "Belgium",
                    "Norway",
                    "Finland",
                    "Denmark",
                    "Switzerland",
                ],
            ),
            (
                ContinentLabel::NorthAmerica,
                &["United States", "Canada", "Mexico"],
            ),
            (
                ContinentLabel::SouthAmerica,
                &["Brazil", "Argentina", "Chile", "Colombia", "Peru", "Uruguay"],
            ),
            (ContinentLabel::Australia, &["Australia", "New Zealand"]),
            (ContinentLabel::Antarctica, &[]),
        ];

        Self {
            version: OVERRIDE_TABLE_VERSION,
            continents: entries
                .into_iter()
                .map(|(label, names)| (label, names.iter().map(|n| n.to_string()).collect()))
                .collect(),
            north_america: Vec::new(),
        }
    }
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self {
            version: OVERRIDE_TABLE_VERSION,
            continents: BTreeMap::new(),
            north_america: Vec::new(),
        }
    }

    /// Check the table once at startup. Returns every problem, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.version != OVERRIDE_TABLE_VERSION {
            errors.push(format!(
                "overrides.version: unsupported version {} (expected {})",
                self.version, OVERRIDE_TABLE_VERSION
            ));
        }

        let mut seen: HashMap<&str, ContinentLabel> = HashMap::new();
        for (label, names) in &self.continents {
            for name in names {
                if name.trim().is_empty() {
                    errors.push(format!("overrides.continents.{}: empty country name", label));
                    continue;
                }
                if let Some(previous) = seen.insert(name.as_str(), *label) {
                    if previous != *label {
                        errors.push(format!(
                            "overrides.continents: '{}' is listed under both {} and {}",
                            name, previous, label
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Compile into a lookup index for resolution.
    pub fn index(&self) -> OverrideIndex {
        let mut by_name = HashMap::new();
        for (label, names) in &self.continents {
            for name in names {
                by_name.entry(name.clone()).or_insert(*label);
            }
        }

        let mut north_america: Vec<String> = self.north_america.clone();
        if let Some(names) = self.continents.get(&ContinentLabel::NorthAmerica) {
            north_america.extend(names.iter().cloned());
        }
        north_america.sort();
        north_america.dedup();

        OverrideIndex {
            by_name,
            north_america,
        }
    }

    pub fn len(&self) -> usize {
        self.continents.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only lookup form of an [`OverrideTable`].
#[derive(Debug, Clone, Default)]
pub struct OverrideIndex {
    by_name: HashMap<String, ContinentLabel>,
    north_america: Vec<String>,
}

impl OverrideIndex {
    pub fn lookup(&self, country: &str) -> Option<ContinentLabel> {
        self.by_name.get(country).copied()
    }

    pub fn is_north_american(&self, country: &str) -> bool {
        self.north_america
            .binary_search_by(|n| n.as_str().cmp(country))
            .is_ok()
    }
}
