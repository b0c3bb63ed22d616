use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::continent::http::DEFAULT_ENDPOINT;
use crate::continent::OverrideTable;
use crate::scoring::{validate_scoring, ScoringConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default input CSV, used when `--dataset` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    #[serde(default)]
    pub overrides: OverrideTable,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Config {
    /// Check every section. Returns all problems at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.overrides.validate() {
            errors.extend(e);
        }
        if let Err(e) = self.classifier.validate() {
            errors.extend(e);
        }
        if let Err(e) = validate_scoring(&self.scoring) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Offline UN region table
    #[default]
    Builtin,
    /// REST Countries compatible web service
    Http,
}

/// Fallback classifier settings.
///
/// Example YAML:
/// ```yaml
/// classifier:
///   kind: http
///   endpoint: https://restcountries.com/v3.1
///   timeout: 5s
///   retries: 3
///   concurrency: 8
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    pub endpoint: String,
    /// Per-name lookup bound, humantime format ("500ms", "5s")
    pub timeout: String,
    pub retries: usize,
    /// Distinct names resolved at once
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Builtin,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: "5s".to_string(),
            retries: 3,
            concurrency: 8,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout)
            .with_context(|| format!("Invalid classifier timeout '{}'", self.timeout))
    }

    /// Short description for logs
    pub fn endpoint_label(&self) -> String {
        match self.kind {
            ClassifierKind::Builtin => "builtin".to_string(),
            ClassifierKind::Http => format!("http ({})", self.endpoint),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match humantime::parse_duration(&self.timeout) {
            Ok(d) if d.is_zero() => {
                errors.push("classifier.timeout: must be greater than zero".to_string())
            }
            Ok(_) => {}
            Err(e) => errors.push(format!(
                "classifier.timeout: invalid duration '{}' - {}",
                self.timeout, e
            )),
        }
        if self.concurrency == 0 {
            errors.push("classifier.concurrency: must be at least 1".to_string());
        }
        if self.kind == ClassifierKind::Http && reqwest::Url::parse(&self.endpoint).is_err() {
            errors.push(format!(
                "classifier.endpoint: invalid URL '{}'",
                self.endpoint
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
