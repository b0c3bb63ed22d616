use super::config::ScoringConfig;
use crate::dataset::Indicator;

/// How far the weight sum may drift from 1 before it is rejected.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let weights = &config.weights;

    for indicator in Indicator::ALL {
        let weight = weights.get(indicator);
        if !weight.is_finite() {
            errors.push(format!(
                "scoring.weights.{}: must be a finite number",
                indicator.key()
            ));
        } else if weight < 0.0 {
            errors.push(format!(
                "scoring.weights.{}: must be non-negative (got {})",
                indicator.key(),
                weight
            ));
        }
    }

    let sum = weights.sum();
    if sum.is_finite() && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!("scoring.weights: must sum to 1 (got {})", sum));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Weights;

    fn config(weights: Weights) -> ScoringConfig {
        ScoringConfig { weights }
    }

    #[test]
    fn test_default_config_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_float_drift_tolerated() {
        let weights = Weights {
            gdp_per_capita: 0.1,
            life_expectancy: 0.2,
            health_exp_per_capita: 0.3,
            child_mortality: 0.4,
        };
        assert!(validate_scoring(&config(weights)).is_ok());
    }

    #[test]
    fn test_bad_sum_rejected() {
        let weights = Weights {
            gdp_per_capita: 0.5,
            ..Weights::default()
        };
        let errors = validate_scoring(&config(weights)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must sum to 1"));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let weights = Weights {
            gdp_per_capita: -0.4,
            life_expectancy: -0.1,
            health_exp_per_capita: 0.2,
            child_mortality: 0.1,
        };
        let errors = validate_scoring(&config(weights)).unwrap_err();
        // two negative weights plus the sum
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("gdp_per_capita"));
        assert!(errors[1].contains("life_expectancy"));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let weights = Weights {
            child_mortality: f64::NAN,
            ..Weights::default()
        };
        let errors = validate_scoring(&config(weights)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("finite"));
    }
}
