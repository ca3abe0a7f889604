//! Distribution and cross-column checks over numeric data.

use super::{ColumnKinds, Detector, columns_of_kind, detector_err};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::profiler::ColumnKind;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::{numeric_values, pearson_correlation, sample_skewness};
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Flags numeric columns with a strongly skewed distribution.
///
/// The threshold carries a 10% tolerance so a column that a log transform
/// pulled just under the line is not re-flagged on the next analysis pass.
pub struct SkewnessDetector;

impl Detector for SkewnessDetector {
    fn name(&self) -> &'static str {
        "skewness"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in columns_of_kind(df, kinds, ColumnKind::Numeric) {
            let values: Vec<f64> = numeric_values(series)
                .map_err(detector_err(self.name()))?
                .into_iter()
                .flatten()
                .collect();

            let mut distinct = values.clone();
            distinct.sort_by(|a, b| a.total_cmp(b));
            distinct.dedup();
            if distinct.len() < 5 {
                continue;
            }
            let range = distinct.last().unwrap() - distinct.first().unwrap();
            if range < 0.01 {
                continue;
            }

            let Some(skew) = sample_skewness(&values) else {
                continue;
            };
            if skew.abs() <= config.skewness_threshold * 1.1 {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::Skewness,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!("Column '{name}' is skewed (skewness {skew:.2})"),
                count: None,
                percentage: None,
                details: HashMap::from([("skewness".to_string(), json!(skew))]),
                recommended_actions: vec!["log".into(), "sqrt".into(), "box_cox".into()],
            });
        }

        Ok(issues)
    }
}

/// Flags pairs of numeric columns that duplicate each other's signal.
pub struct CorrelationDetector;

impl Detector for CorrelationDetector {
    fn name(&self) -> &'static str {
        "correlated_features"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let columns = columns_of_kind(df, kinds, ColumnKind::Numeric);
        if columns.len() < 2 {
            return Ok(Vec::new());
        }

        let mut values = Vec::with_capacity(columns.len());
        for (name, series) in &columns {
            values.push((
                name.clone(),
                numeric_values(series).map_err(detector_err(self.name()))?,
            ));
        }

        let mut pairs = Vec::new();
        let mut affected = Vec::new();
        for i in 0..values.len() {
            for j in (i + 1)..values.len() {
                let Some(r) = pearson_correlation(&values[i].1, &values[j].1) else {
                    continue;
                };
                if r.abs() <= config.correlation_threshold {
                    continue;
                }
                for name in [&values[i].0, &values[j].0] {
                    if !affected.contains(name) {
                        affected.push(name.clone());
                    }
                }
                pairs.push(json!({
                    "column_1": values[i].0,
                    "column_2": values[j].0,
                    "correlation": r,
                }));
            }
        }

        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![DataIssue {
            issue_type: IssueType::CorrelatedFeatures,
            severity: Severity::Low,
            description: format!("Found {} highly correlated column pairs", pairs.len()),
            affected_columns: affected,
            count: Some(pairs.len() as u64),
            percentage: None,
            details: HashMap::from([("correlations".to_string(), json!(pairs))]),
            recommended_actions: vec!["drop_one".into()],
        }])
    }
}

/// Range rules keyed off common column-name fragments: the rule name goes
/// into the issue details.
const RANGE_RULES: [(&str, &str, f64, f64); 8] = [
    ("percent", "0 to 100", 0.0, 100.0),
    ("age", "0 to 150", 0.0, 150.0),
    ("price", "non-negative", 0.0, f64::INFINITY),
    ("cost", "non-negative", 0.0, f64::INFINITY),
    ("quantity", "non-negative", 0.0, f64::INFINITY),
    ("count", "non-negative", 0.0, f64::INFINITY),
    ("salary", "non-negative", 0.0, f64::INFINITY),
    ("income", "non-negative", 0.0, f64::INFINITY),
];

/// Flags values that violate what the column name implies.
///
/// Purely heuristic; first matching fragment wins, with "percent" checked
/// before "age" so percentage columns get the tighter rule. Fixing a
/// violation needs domain knowledge, so no transform is recommended.
pub struct InvalidRangeDetector;

impl Detector for InvalidRangeDetector {
    fn name(&self) -> &'static str {
        "invalid_ranges"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        _config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in columns_of_kind(df, kinds, ColumnKind::Numeric) {
            let lower_name = name.to_lowercase();
            let Some((_, rule, min, max)) = RANGE_RULES
                .iter()
                .find(|(fragment, ..)| lower_name.contains(fragment))
            else {
                continue;
            };

            let violations = numeric_values(series)
                .map_err(detector_err(self.name()))?
                .into_iter()
                .flatten()
                .filter(|v| v < min || v > max)
                .count();
            if violations == 0 {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::InvalidRanges,
                severity: Severity::High,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{name}' has {violations} values outside the expected range ({rule})"
                ),
                count: Some(violations as u64),
                percentage: Some(violations as f64 / series.len().max(1) as f64 * 100.0),
                details: HashMap::from([
                    ("rule".to_string(), json!(rule)),
                    ("violations".to_string(), json!(violations)),
                ]),
                recommended_actions: Vec::new(),
            });
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::infer_kinds;

    fn run(detector: &dyn Detector, df: &DataFrame) -> Vec<DataIssue> {
        let config = EngineConfig::default();
        let kinds = infer_kinds(df, &config);
        detector.detect(df, &kinds, &config).unwrap()
    }

    #[test]
    fn test_exponential_tail_is_flagged() {
        let df = df!["v" => [1.0f64, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0, 200.0, 400.0]].unwrap();

        let issues = run(&SkewnessDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].affected_columns, vec!["v"]);
    }

    #[test]
    fn test_symmetric_column_is_clean() {
        let df = df!["v" => [1.0f64, 2.0, 3.0, 4.0, 5.0]].unwrap();
        assert!(run(&SkewnessDetector, &df).is_empty());
    }

    #[test]
    fn test_near_duplicate_columns_are_correlated() {
        let df = df![
            "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
            "b" => [2.0f64, 4.0, 6.0, 8.0, 10.0],
            "c" => [9.0f64, 3.0, 7.0, 1.0, 5.0],
        ]
        .unwrap();

        let issues = run(&CorrelationDetector, &df);
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.affected_columns, vec!["a", "b"]);
        assert_eq!(issue.count, Some(1));
        let r = issue.details["correlations"][0]["correlation"]
            .as_f64()
            .unwrap();
        assert!((r - 1.0).abs() < 1e-9, "correlation was {r}");
    }

    #[test]
    fn test_negative_age_violates_range() {
        let df = df!["age" => [25i64, -3, 40, 200]].unwrap();

        let issues = run(&InvalidRangeDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, Some(2));
        assert_eq!(issues[0].details["rule"], json!("0 to 150"));
    }

    #[test]
    fn test_percentage_rule_wins_over_age_fragment() {
        let df = df!["percentage" => [10.0f64, 120.0, 50.0]].unwrap();
        assert_eq!(
            run(&InvalidRangeDetector, &df)[0].details["rule"],
            json!("0 to 100")
        );
    }
}
