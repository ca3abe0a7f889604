//! Dates-stored-as-text detection.

use super::{ColumnKinds, Detector, detector_err, string_columns};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::profiler::is_date_like;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::non_null_string_values;
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Rows sampled per column when probing for date-shaped strings.
const SAMPLE_SIZE: usize = 100;

/// Flags string columns that mostly hold date-shaped values.
///
/// Dates stored as text in assorted formats sort wrong and resist
/// comparison; the `convert` transform rewrites them into one canonical
/// format.
pub struct DateFormatDetector;

impl Detector for DateFormatDetector {
    fn name(&self) -> &'static str {
        "wrong_date_format"
    }

    fn detect(
        &self,
        df: &DataFrame,
        _kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in string_columns(df) {
            let values = non_null_string_values(&series).map_err(detector_err(self.name()))?;
            if values.is_empty() {
                continue;
            }

            let sample = &values[..values.len().min(SAMPLE_SIZE)];
            let matching = sample.iter().filter(|v| is_date_like(v)).count();
            let fraction = matching as f64 / sample.len() as f64;
            if fraction <= config.date_match_fraction {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::WrongDateFormat,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!("Column '{name}' holds dates stored as text"),
                count: Some(matching as u64),
                percentage: Some(fraction * 100.0),
                details: HashMap::from([("date_like_fraction".to_string(), json!(fraction))]),
                recommended_actions: vec!["convert".into(), "extract".into()],
            });
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::infer_kinds;

    fn detect(df: &DataFrame) -> Vec<DataIssue> {
        let config = EngineConfig::default();
        let kinds = infer_kinds(df, &config);
        DateFormatDetector.detect(df, &kinds, &config).unwrap()
    }

    #[test]
    fn test_textual_dates_are_flagged() {
        let df = df!["signup" => ["2024-01-05", "2024-02-10", "03/15/2024", "soon"]].unwrap();

        let issues = detect(&df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, Some(3));
        assert_eq!(issues[0].percentage, Some(75.0));
    }

    #[test]
    fn test_half_date_like_is_not_enough() {
        let df = df!["note" => ["2024-01-05", "hello", "2024-02-10", "world"]].unwrap();
        assert!(detect(&df).is_empty());
    }
}
