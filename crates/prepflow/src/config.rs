//! Configuration for the analysis and preprocessing engine.
//!
//! Every detector threshold lives here as a named constant-with-default.
//! Threshold-sensitive behavior is a property of this configuration, not
//! of the detectors themselves.

use serde::{Deserialize, Serialize};

/// Tunable thresholds for detection, transformation, and resampling.
///
/// Use [`EngineConfig::builder()`] for fluent construction:
///
/// ```rust,ignore
/// let config = EngineConfig::builder()
///     .skewness_threshold(0.75)
///     .high_cardinality_threshold(100)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// IQR multiplier for outlier bounds. Default: 1.5
    pub outlier_iqr_multiplier: f64,

    /// Distinct-value count above which a categorical column is flagged as
    /// high cardinality. Default: 50
    pub high_cardinality_threshold: usize,

    /// Absolute Pearson correlation above which a numeric pair is flagged
    /// as redundant. Default: 0.9
    pub correlation_threshold: f64,

    /// Absolute skewness coefficient above which a distribution is flagged.
    /// Detection applies a 10% tolerance on top of this value so marginally
    /// skewed columns are not re-flagged after transformation. Default: 1.0
    pub skewness_threshold: f64,

    /// Largest-to-smallest class frequency ratio above which a candidate
    /// label column is flagged as imbalanced. Default: 3.0
    pub imbalance_ratio_threshold: f64,

    /// Minimum distinct classes for a column to count as a plausible label.
    /// Default: 2
    pub imbalance_min_classes: usize,

    /// Maximum distinct classes for a column to count as a plausible label.
    /// Default: 10
    pub imbalance_max_classes: usize,

    /// Severity ladder for percentage-scaled issues (missing values,
    /// duplicates): fractions below these bounds map to low / medium / high,
    /// anything above the last is critical. Defaults: 0.05, 0.15, 0.30
    pub severity_low_bound: f64,
    pub severity_medium_bound: f64,
    pub severity_high_bound: f64,

    /// Fraction of parseable values required to classify a string column as
    /// numeric during type inference. Default: 0.9
    pub numeric_fraction: f64,

    /// Fraction of date-pattern matches required to classify a string column
    /// as datetime during type inference. Default: 0.7
    pub datetime_fraction: f64,

    /// Distinct/total ratio below which a string column counts as
    /// categorical rather than free text. Default: 0.5
    pub categorical_unique_ratio: f64,

    /// Absolute distinct-value cap for the categorical classification.
    /// Default: 50
    pub categorical_unique_cap: usize,

    /// Fraction of date-pattern matches in a sampled string column required
    /// to flag it as wrong_date_format. Default: 0.5
    pub date_match_fraction: f64,

    /// Mean non-alphanumeric character ratio above which a text column is
    /// flagged as noisy. Default: 0.2
    pub special_char_ratio: f64,

    /// Relative frequency below which a category is bucketed into "Other"
    /// by the group_rare transform. Default: 0.05
    pub rare_category_fraction: f64,

    /// Neighbour count for SMOTE interpolation (clamped to class size - 1).
    /// Default: 5
    pub smote_neighbors: usize,

    /// RNG seed for resampling, making resolver output reproducible.
    /// Default: 42
    pub resample_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: 1.5,
            high_cardinality_threshold: 50,
            correlation_threshold: 0.9,
            skewness_threshold: 1.0,
            imbalance_ratio_threshold: 3.0,
            imbalance_min_classes: 2,
            imbalance_max_classes: 10,
            severity_low_bound: 0.05,
            severity_medium_bound: 0.15,
            severity_high_bound: 0.30,
            numeric_fraction: 0.9,
            datetime_fraction: 0.7,
            categorical_unique_ratio: 0.5,
            categorical_unique_cap: 50,
            date_match_fraction: 0.5,
            special_char_ratio: 0.2,
            rare_category_fraction: 0.05,
            smote_neighbors: 5,
            resample_seed: 42,
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Map a 0.0-1.0 fraction to a severity using the configured ladder.
    pub fn severity_for_fraction(&self, fraction: f64) -> crate::types::Severity {
        use crate::types::Severity;
        if fraction < self.severity_low_bound {
            Severity::Low
        } else if fraction < self.severity_medium_bound {
            Severity::Medium
        } else if fraction < self.severity_high_bound {
            Severity::High
        } else {
            Severity::Critical
        }
    }

    /// Validate the configuration and return an error if inconsistent.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("numeric_fraction", self.numeric_fraction),
            ("datetime_fraction", self.datetime_fraction),
            ("categorical_unique_ratio", self.categorical_unique_ratio),
            ("date_match_fraction", self.date_match_fraction),
            ("special_char_ratio", self.special_char_ratio),
            ("rare_category_fraction", self.rare_category_fraction),
            ("severity_low_bound", self.severity_low_bound),
            ("severity_medium_bound", self.severity_medium_bound),
            ("severity_high_bound", self.severity_high_bound),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidFraction {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.severity_low_bound > self.severity_medium_bound
            || self.severity_medium_bound > self.severity_high_bound
        {
            return Err(ConfigValidationError::SeverityLadderNotMonotonic);
        }

        if self.outlier_iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::NonPositive {
                field: "outlier_iqr_multiplier".to_string(),
            });
        }

        if self.imbalance_ratio_threshold <= 1.0 {
            return Err(ConfigValidationError::OutOfRange {
                field: "imbalance_ratio_threshold".to_string(),
                requirement: "must be greater than 1.0",
            });
        }

        if self.imbalance_min_classes < 2 || self.imbalance_min_classes > self.imbalance_max_classes
        {
            return Err(ConfigValidationError::InvalidClassRange {
                min: self.imbalance_min_classes,
                max: self.imbalance_max_classes,
            });
        }

        if self.smote_neighbors == 0 {
            return Err(ConfigValidationError::NonPositive {
                field: "smote_neighbors".to_string(),
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid fraction for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidFraction { field: String, value: f64 },

    #[error("Severity ladder bounds must be non-decreasing")]
    SeverityLadderNotMonotonic,

    #[error("'{field}' must be positive")]
    NonPositive { field: String },

    #[error("'{field}' {requirement}")]
    OutOfRange {
        field: String,
        requirement: &'static str,
    },

    #[error("Invalid imbalance class range: {min}..={max}")]
    InvalidClassRange { min: usize, max: usize },
}

/// Builder for [`EngineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: Option<EngineConfig>,
}

macro_rules! builder_setter {
    ($name:ident, $ty:ty) => {
        pub fn $name(mut self, value: $ty) -> Self {
            self.config.get_or_insert_with(EngineConfig::default).$name = value;
            self
        }
    };
}

impl EngineConfigBuilder {
    builder_setter!(outlier_iqr_multiplier, f64);
    builder_setter!(high_cardinality_threshold, usize);
    builder_setter!(correlation_threshold, f64);
    builder_setter!(skewness_threshold, f64);
    builder_setter!(imbalance_ratio_threshold, f64);
    builder_setter!(imbalance_min_classes, usize);
    builder_setter!(imbalance_max_classes, usize);
    builder_setter!(numeric_fraction, f64);
    builder_setter!(datetime_fraction, f64);
    builder_setter!(categorical_unique_ratio, f64);
    builder_setter!(categorical_unique_cap, usize);
    builder_setter!(date_match_fraction, f64);
    builder_setter!(special_char_ratio, f64);
    builder_setter!(rare_category_fraction, f64);
    builder_setter!(smote_neighbors, usize);
    builder_setter!(resample_seed, u64);

    /// Build the configuration, validating the result.
    pub fn build(self) -> Result<EngineConfig, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }
}
