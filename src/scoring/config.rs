use serde::{Deserialize, Serialize};

use crate::dataset::Indicator;

/// Scoring configuration.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     gdp_per_capita: 0.4
///     life_expectancy: 0.3
///     health_exp_per_capita: 0.2
///     child_mortality: 0.1
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: Weights,
}

/// Per-indicator weights of the composite progress score.
///
/// Fields left out of a config file keep their default weight, so a partial
/// override usually needs the others adjusted too for the sum to stay 1.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub gdp_per_capita: f64,
    pub life_expectancy: f64,
    pub health_exp_per_capita: f64,
    pub child_mortality: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            gdp_per_capita: 0.4,
            life_expectancy: 0.3,
            health_exp_per_capita: 0.2,
            child_mortality: 0.1,
        }
    }
}

impl Weights {
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::GdpPerCapita => self.gdp_per_capita,
            Indicator::LifeExpectancy => self.life_expectancy,
            Indicator::HealthExpPerCapita => self.health_exp_per_capita,
            Indicator::ChildMortality => self.child_mortality,
        }
    }

    pub fn sum(&self) -> f64 {
        Indicator::ALL.iter().map(|&i| self.get(i)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = Weights::default();
        assert_eq!(weights.get(Indicator::GdpPerCapita), 0.4);
        assert_eq!(weights.get(Indicator::LifeExpectancy), 0.3);
        assert_eq!(weights.get(Indicator::HealthExpPerCapita), 0.2);
        assert_eq!(weights.get(Indicator::ChildMortality), 0.1);
        assert!((weights.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_weights_parse() {
        let yaml = r#"
weights:
  gdp_per_capita: 0.25
  life_expectancy: 0.45
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.weights.gdp_per_capita, 0.25);
        assert_eq!(config.weights.life_expectancy, 0.45);
        assert_eq!(config.weights.health_exp_per_capita, 0.2);
        assert_eq!(config.weights.child_mortality, 0.1);
    }

    #[test]
    fn test_empty_scoring_section_uses_defaults() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
    }

    #[test]
    fn test_unknown_weight_rejected() {
        let yaml = r#"
weights:
  population: 0.5
"#;
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }
}
