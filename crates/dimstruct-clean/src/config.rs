//! Serializable configuration of a cleaning run

use serde::{Deserialize, Serialize};

use crate::{
    adequacy::{DEFAULT_MIN_ROWS, DEFAULT_MIN_ROWS_PER_COLUMN},
    error::ConfigurationError,
    handoff::{DEFAULT_BOOT_ITER, DistanceMetric},
    outlier::DEFAULT_QUANTILE_MULTIPLIER,
    patterns::Preset,
    prune::DEFAULT_CORRELATION_THRESHOLD,
    skew::DEFAULT_SKEW_THRESHOLD,
};

/// Every tunable of the pipeline, with the defaults of the reference analysis.
///
/// Missing fields take their default, so a partial JSON document is valid:
///
/// ```
/// use dimstruct_clean::config::CleaningConfig;
///
/// let config: CleaningConfig =
///     serde_json::from_str(r#"{ "skew_threshold": 1.5, "saved_patterns": ["holt"] }"#).unwrap();
/// assert_eq!(config.skew_threshold, 1.5);
/// assert_eq!(config.quantile_multiplier, 2.5);
/// assert!(config.drop_patterns.is_empty());
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningConfig {
    pub quantile_multiplier: f64,
    pub skew_threshold: f64,
    pub correlation_threshold: f64,
    /// Empty means the curated default pattern groups.
    pub drop_patterns: Vec<String>,
    pub saved_patterns: Vec<String>,
    /// Explicit positive-skew class; `None` computes it from the data.
    pub positive_skew: Option<Vec<String>>,
    /// Explicit negative-skew class; `None` computes it from the data.
    pub negative_skew: Option<Vec<String>>,
    pub min_rows: usize,
    pub min_rows_per_column: f64,
    pub dist_metric: DistanceMetric,
    pub boot_iter: usize,
    pub strict: bool,
    pub verbose: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            quantile_multiplier: DEFAULT_QUANTILE_MULTIPLIER,
            skew_threshold: DEFAULT_SKEW_THRESHOLD,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            drop_patterns: vec![],
            saved_patterns: vec![],
            positive_skew: None,
            negative_skew: None,
            min_rows: DEFAULT_MIN_ROWS,
            min_rows_per_column: DEFAULT_MIN_ROWS_PER_COLUMN,
            dist_metric: DistanceMetric::default(),
            boot_iter: DEFAULT_BOOT_ITER,
            strict: false,
            verbose: false,
        }
    }
}

impl CleaningConfig {
    /// Configuration restricted to behavioral tasks.
    #[must_use]
    pub fn from_preset(preset: &Preset) -> Self {
        let owned = |patterns: &[&str]| patterns.iter().map(|&p| p.to_owned()).collect();
        Self {
            drop_patterns: owned(preset.drop),
            saved_patterns: owned(preset.saved),
            ..Self::default()
        }
    }

    /// Checks numeric ranges. Patterns are checked when compiled.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let multiplier = self.quantile_multiplier;
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(ConfigurationError::NonPositiveMultiplier { value: multiplier });
        }
        let skew = self.skew_threshold;
        if skew.is_nan() || skew <= 0.0 {
            return Err(ConfigurationError::NonPositiveSkewThreshold { value: skew });
        }
        let correlation = self.correlation_threshold;
        if correlation.is_nan() || correlation <= 0.0 || correlation > 1.0 {
            return Err(ConfigurationError::CorrelationThresholdOutOfRange { value: correlation });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::TASK_BATTERY;

    #[test]
    fn test_defaults_are_valid() {
        CleaningConfig::default().validate().unwrap();
    }

    #[test]
    fn test_out_of_range_values() {
        let config = CleaningConfig {
            correlation_threshold: 1.2,
            ..CleaningConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::CorrelationThresholdOutOfRange { .. })
        ));
        let config = CleaningConfig {
            quantile_multiplier: -1.0,
            ..CleaningConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::NonPositiveMultiplier { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<CleaningConfig>(r#"{ "skew": 1.0 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_preset_config() {
        let config = CleaningConfig::from_preset(&TASK_BATTERY);
        assert_eq!(config.drop_patterns, ["survey"]);
        assert_eq!(config.saved_patterns, ["holt", "cognitive_reflection"]);
        assert_eq!(config.dist_metric, DistanceMetric::AbsCorrelation);
    }

    #[test]
    fn test_round_trip_keeps_overrides() {
        let config = CleaningConfig {
            positive_skew: Some(vec!["stroop.rt".to_owned()]),
            ..CleaningConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<CleaningConfig>(&json).unwrap(), config);
    }
}
