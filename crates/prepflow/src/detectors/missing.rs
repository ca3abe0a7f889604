//! Missing-value detection.

use super::{ColumnKinds, Detector};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{DataIssue, IssueType};
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Reports one aggregate issue covering every column with nulls.
///
/// Per-column counts and percentages land in the details payload so a
/// caller can fill columns selectively; severity follows the share of
/// missing cells in the whole dataset.
pub struct MissingValueDetector;

impl Detector for MissingValueDetector {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn detect(
        &self,
        df: &DataFrame,
        _kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let height = df.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        let mut affected = Vec::new();
        let mut details = HashMap::new();
        let mut total_missing = 0u64;

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let nulls = series.null_count() as u64;
            if nulls == 0 {
                continue;
            }
            total_missing += nulls;
            let percentage = nulls as f64 / height as f64 * 100.0;
            affected.push(series.name().to_string());
            details.insert(
                series.name().to_string(),
                json!({ "count": nulls, "percentage": percentage }),
            );
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }

        let total_cells = (height * df.width()) as f64;
        let fraction = total_missing as f64 / total_cells;
        let issue = DataIssue {
            issue_type: IssueType::MissingValues,
            severity: config.severity_for_fraction(fraction),
            description: format!(
                "Found {} missing values across {} columns",
                total_missing,
                affected.len()
            ),
            affected_columns: affected,
            count: Some(total_missing),
            percentage: Some(fraction * 100.0),
            details,
            recommended_actions: vec![
                "mean".into(),
                "median".into(),
                "mode".into(),
                "forward_fill".into(),
                "backward_fill".into(),
                "drop_rows".into(),
            ],
        };
        Ok(vec![issue])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::infer_kinds;
    use crate::types::Severity;

    fn detect(df: &DataFrame) -> Vec<DataIssue> {
        let config = EngineConfig::default();
        let kinds = infer_kinds(df, &config);
        MissingValueDetector.detect(df, &kinds, &config).unwrap()
    }

    #[test]
    fn test_reports_single_aggregate_issue() {
        let df = df![
            "a" => [Some(1.0f64), None, Some(3.0), None],
            "b" => [None::<&str>, Some("x"), Some("y"), Some("z")],
            "c" => [1i64, 2, 3, 4],
        ]
        .unwrap();

        let issues = detect(&df);
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.issue_type, IssueType::MissingValues);
        assert_eq!(issue.affected_columns, vec!["a", "b"]);
        assert_eq!(issue.count, Some(3));
        // 3 missing cells out of 12.
        assert_eq!(issue.percentage, Some(25.0));
        assert_eq!(issue.details["a"]["count"], json!(2));
        assert_eq!(issue.details["a"]["percentage"], json!(50.0));
    }

    #[test]
    fn test_severity_tracks_overall_missing_share() {
        // 1 of 20 cells missing -> 5% -> medium on the default ladder.
        let df = df![
            "a" => [Some(1i64), Some(2), Some(3), Some(4), None],
            "b" => [1i64, 2, 3, 4, 5],
            "c" => [1i64, 2, 3, 4, 5],
            "d" => [1i64, 2, 3, 4, 5],
        ]
        .unwrap();
        assert_eq!(detect(&df)[0].severity, Severity::Medium);
    }

    #[test]
    fn test_complete_dataset_is_clean() {
        let df = df!["a" => [1i64, 2, 3]].unwrap();
        assert!(detect(&df).is_empty());
    }
}
