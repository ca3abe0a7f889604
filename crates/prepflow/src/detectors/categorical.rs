//! Detectors over categorical and label-like columns.

use super::{ColumnKinds, Detector, columns_of_kind, detector_err, string_columns};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::profiler::ColumnKind;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::{canonical_label, non_null_string_values, string_values};
use polars::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

/// Flags label sets that collapse under canonicalization.
///
/// "NY", "ny " and "N.Y." are almost certainly the same category entered
/// three ways; the `normalize` transform applies the same canonical form.
pub struct CategoricalInconsistencyDetector;

impl Detector for CategoricalInconsistencyDetector {
    fn name(&self) -> &'static str {
        "categorical_inconsistencies"
    }

    fn detect(
        &self,
        df: &DataFrame,
        _kinds: &ColumnKinds,
        _config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in string_columns(df) {
            let values = non_null_string_values(&series).map_err(detector_err(self.name()))?;

            // canonical form -> distinct raw spellings, in first-seen order
            let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for value in &values {
                let canonical = canonical_label(value);
                let variants = groups.entry(canonical).or_default();
                if !variants.contains(value) {
                    variants.push(value.clone());
                }
            }

            let colliding: BTreeMap<&str, &Vec<String>> = groups
                .iter()
                .filter(|(_, variants)| variants.len() > 1)
                .map(|(canonical, variants)| (canonical.as_str(), variants))
                .collect();
            if colliding.is_empty() {
                continue;
            }

            let variant_count: usize = colliding.values().map(|v| v.len()).sum();
            issues.push(DataIssue {
                issue_type: IssueType::CategoricalInconsistencies,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{}' has {} label spellings collapsing into {} categories",
                    name,
                    variant_count,
                    colliding.len()
                ),
                count: Some(variant_count as u64),
                percentage: None,
                details: HashMap::from([("variants".to_string(), json!(colliding))]),
                recommended_actions: vec![
                    "normalize".into(),
                    "label_encode".into(),
                    "one_hot_encode".into(),
                ],
            });
        }

        Ok(issues)
    }
}

/// Flags string columns with more distinct values than a category column
/// should reasonably hold.
pub struct HighCardinalityDetector;

impl Detector for HighCardinalityDetector {
    fn name(&self) -> &'static str {
        "high_cardinality"
    }

    fn detect(
        &self,
        df: &DataFrame,
        _kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in string_columns(df) {
            let unique = series.n_unique().map_err(detector_err(self.name()))?;
            let unique = unique - usize::from(series.null_count() > 0);
            if unique <= config.high_cardinality_threshold {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::HighCardinality,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!("Column '{name}' has {unique} unique values"),
                count: Some(unique as u64),
                percentage: Some(unique as f64 / series.len().max(1) as f64 * 100.0),
                details: HashMap::from([("unique_count".to_string(), json!(unique))]),
                recommended_actions: vec!["group_rare".into()],
            });
        }

        Ok(issues)
    }
}

/// Flags columns carrying a single distinct non-null value.
pub struct ConstantValueDetector;

impl Detector for ConstantValueDetector {
    fn name(&self) -> &'static str {
        "constant_values"
    }

    fn detect(
        &self,
        df: &DataFrame,
        _kinds: &ColumnKinds,
        _config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            let values = string_values(series).map_err(detector_err(self.name()))?;

            let mut distinct: Option<&str> = None;
            let mut constant = true;
            for value in values.iter().flatten() {
                match distinct {
                    None => distinct = Some(value),
                    Some(seen) if seen == value => {}
                    Some(_) => {
                        constant = false;
                        break;
                    }
                }
            }
            let Some(value) = distinct else { continue };
            if !constant {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::ConstantValues,
                severity: Severity::Low,
                affected_columns: vec![name.clone()],
                description: format!("Column '{name}' is constant"),
                count: None,
                percentage: None,
                details: HashMap::from([("value".to_string(), json!(value))]),
                recommended_actions: vec!["drop_column".into()],
            });
        }

        Ok(issues)
    }
}

/// Flags categorical columns whose class distribution is lopsided enough to
/// bias a downstream model.
///
/// Only columns that look like classification targets are considered, i.e.
/// between `imbalance_min_classes` and `imbalance_max_classes` distinct
/// labels. Resampling needs an explicit target column, so this detector is
/// report-only and the fix-all pass leaves it alone.
pub struct ImbalanceDetector;

impl Detector for ImbalanceDetector {
    fn name(&self) -> &'static str {
        "imbalanced_data"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in columns_of_kind(df, kinds, ColumnKind::Categorical) {
            let values = non_null_string_values(series).map_err(detector_err(self.name()))?;

            let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
            for value in values {
                *distribution.entry(value).or_insert(0) += 1;
            }
            let classes = distribution.len();
            if classes < config.imbalance_min_classes || classes > config.imbalance_max_classes {
                continue;
            }

            let max = distribution.values().copied().max().unwrap_or(0);
            let min = distribution.values().copied().min().unwrap_or(0);
            if min == 0 {
                continue;
            }
            let ratio = max as f64 / min as f64;
            if ratio <= config.imbalance_ratio_threshold {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::ImbalancedData,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{name}' is imbalanced ({classes} classes, ratio {ratio:.1})"
                ),
                count: None,
                percentage: None,
                details: HashMap::from([
                    ("distribution".to_string(), json!(distribution)),
                    ("imbalance_ratio".to_string(), json!(ratio)),
                ]),
                recommended_actions: vec![
                    "smote".into(),
                    "oversample".into(),
                    "undersample".into(),
                ],
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
    fn test_spelling_variants_collapse() {
        let df = df!["city" => ["NY", "ny ", "N.Y.", "LA"]].unwrap();

        let issues = run(&CategoricalInconsistencyDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, Some(3));
        assert_eq!(
            issues[0].details["variants"]["ny"],
            json!(["NY", "ny ", "N.Y."])
        );
    }

    #[test]
    fn test_consistent_labels_are_clean() {
        let df = df!["city" => ["NY", "LA", "NY"]].unwrap();
        assert!(run(&CategoricalInconsistencyDetector, &df).is_empty());
    }

    #[test]
    fn test_high_cardinality_over_threshold() {
        let labels: Vec<String> = (0..60).map(|i| format!("id_{i}")).collect();
        let df = df!["id" => labels].unwrap();

        let issues = run(&HighCardinalityDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, Some(60));
    }

    #[test]
    fn test_constant_column_flagged_even_with_nulls() {
        let df = df![
            "flag" => [Some("yes"), Some("yes"), None],
            "mixed" => [Some("a"), Some("b"), None],
        ]
        .unwrap();

        let issues = run(&ConstantValueDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].affected_columns, vec!["flag"]);
        assert_eq!(issues[0].details["value"], json!("yes"));
    }

    #[test]
    fn test_imbalanced_two_class_column() {
        let mut labels = vec!["A"; 95];
        labels.extend(vec!["B"; 5]);
        let df = df!["target" => labels].unwrap();

        let issues = run(&ImbalanceDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].details["imbalance_ratio"], json!(19.0));
        assert_eq!(issues[0].details["distribution"]["A"], json!(95));
    }

    #[test]
    fn test_balanced_column_is_clean() {
        let df = df!["target" => ["A", "A", "B", "B"]].unwrap();
        assert!(run(&ImbalanceDetector, &df).is_empty());
    }
}
