use serde::{Deserialize, Serialize};
use std::future::Future;

use super::builtin::BuiltinClassifier;
use super::http::HttpClassifier;
use super::label::ContinentLabel;
use super::overrides::OverrideIndex;
use crate::error::Unresolved;

/// What a geographic classifier answered for one name.
///
/// The three shapes are normalized into a [`ContinentLabel`] by
/// [`Classification::into_label`] and never travel further than that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Single(String),
    Candidates(Vec<String>),
    Failed(String),
}

impl Classification {
    /// Normalize a classifier answer into the closed label set.
    ///
    /// - lists collapse to their first candidate
    /// - "Oceania" becomes Australia
    /// - "Americas" becomes North America if the override index lists the country
    ///   as North American, otherwise South America
    /// - sentinels and unknown regions are `NoMatch`, failures are `LookupFailed`
    pub fn into_label(
        self,
        country: &str,
        overrides: &OverrideIndex,
    ) -> Result<ContinentLabel, Unresolved> {
        let region = match self {
            Classification::Single(region) => region,
            Classification::Candidates(candidates) => match candidates.into_iter().next() {
                Some(first) => first,
                None => return Err(Unresolved::NoMatch(country.to_string())),
            },
            Classification::Failed(reason) => {
                return Err(Unresolved::LookupFailed {
                    name: country.to_string(),
                    reason,
                })
            }
        };

        match region.trim() {
            "Oceania" => Ok(ContinentLabel::Australia),
            "Americas" => {
                if overrides.is_north_american(country) {
                    Ok(ContinentLabel::NorthAmerica)
                } else {
                    Ok(ContinentLabel::SouthAmerica)
                }
            }
            other => ContinentLabel::from_label(other)
                .ok_or_else(|| Unresolved::NoMatch(country.to_string())),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Classification::Failed(_))
    }
}

/// A geographic name → continent lookup used when no override applies.
pub trait ContinentClassifier {
    /// Short stable identifier, used to namespace persisted cache entries.
    fn kind(&self) -> &'static str;

    fn classify(&self, country: &str) -> impl Future<Output = Classification> + Send;
}

/// Classifier chosen from configuration.
#[derive(Debug, Clone)]
pub enum Classifier {
    Builtin(BuiltinClassifier),
    Http(HttpClassifier),
}

impl ContinentClassifier for Classifier {
    fn kind(&self) -> &'static str {
        match self {
            Classifier::Builtin(c) => c.kind(),
            Classifier::Http(c) => c.kind(),
        }
    }

    async fn classify(&self, country: &str) -> Classification {
        match self {
            Classifier::Builtin(c) => c.classify(country).await,
            Classifier::Http(c) => c.classify(country).await,
        }
    }
}
