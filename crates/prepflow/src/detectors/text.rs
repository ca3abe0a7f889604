//! Free-text hygiene detectors.

use super::{ColumnKinds, Detector, columns_of_kind, detector_err, string_columns};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::profiler::ColumnKind;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::non_null_string_values;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

static UNIT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?\d+(?:\.\d+)?\s*([a-zA-Z%°]+)\s*$").unwrap());

/// Flags text columns cluttered with punctuation and symbols.
pub struct NoisyTextDetector;

impl Detector for NoisyTextDetector {
    fn name(&self) -> &'static str {
        "noisy_text"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut issues = Vec::new();

        for (name, series) in columns_of_kind(df, kinds, ColumnKind::Text) {
            let values = non_null_string_values(series).map_err(detector_err(self.name()))?;
            if values.is_empty() {
                continue;
            }

            let mut ratio_sum = 0.0;
            for value in &values {
                let total = value.chars().count();
                if total == 0 {
                    continue;
                }
                let special = value
                    .chars()
                    .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
                    .count();
                ratio_sum += special as f64 / total as f64;
            }
            let mean_ratio = ratio_sum / values.len() as f64;
            if mean_ratio <= config.special_char_ratio {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::NoisyText,
                severity: Severity::Low,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{name}' averages {:.0}% special characters",
                    mean_ratio * 100.0
                ),
                count: None,
                percentage: Some(mean_ratio * 100.0),
                details: HashMap::from([("special_char_ratio".to_string(), json!(mean_ratio))]),
                recommended_actions: vec!["clean".into(), "lowercase".into()],
            });
        }

        Ok(issues)
    }
}

/// Flags columns carrying replacement or control characters, the usual
/// residue of reading a file with the wrong encoding.
pub struct EncodingDetector;

impl Detector for EncodingDetector {
    fn name(&self) -> &'static str {
        "encoding_issues"
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
            let affected = values
                .iter()
                .filter(|v| {
                    v.chars()
                        .any(|c| c == '\u{fffd}' || (c.is_control() && c != '\t'))
                })
                .count();
            if affected == 0 {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::EncodingIssues,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{name}' has {affected} values with replacement or control characters"
                ),
                count: Some(affected as u64),
                percentage: Some(affected as f64 / values.len().max(1) as f64 * 100.0),
                details: HashMap::from([("affected_values".to_string(), json!(affected))]),
                recommended_actions: vec!["clean".into(), "lowercase".into()],
            });
        }

        Ok(issues)
    }
}

/// Flags `<number><suffix>` columns measured in more than one unit.
///
/// "5kg" next to "11 lb" cannot be compared numerically until someone picks
/// a unit, so this is report-only.
pub struct MixedUnitDetector;

impl Detector for MixedUnitDetector {
    fn name(&self) -> &'static str {
        "mixed_units"
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

            let mut units: BTreeMap<String, u64> = BTreeMap::new();
            for value in &values {
                if let Some(captures) = UNIT_VALUE.captures(value) {
                    *units.entry(captures[1].to_lowercase()).or_insert(0) += 1;
                }
            }
            if units.len() < 2 {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::MixedUnits,
                severity: Severity::Medium,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{}' mixes {} different unit suffixes",
                    name,
                    units.len()
                ),
                count: Some(units.values().sum()),
                percentage: None,
                details: HashMap::from([("units".to_string(), json!(units))]),
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
    fn test_markup_heavy_text_is_noisy() {
        let df = df![
            "comment" => ["<b>great!!!</b>", "#@$% awful...", "ok {fine}", "** meh **"],
        ]
        .unwrap();

        let issues = run(&NoisyTextDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].affected_columns, vec!["comment"]);
    }

    #[test]
    fn test_plain_sentences_are_clean() {
        let df = df![
            "comment" => ["great service", "would order again", "arrived late", "fine"],
        ]
        .unwrap();
        assert!(run(&NoisyTextDetector, &df).is_empty());
    }

    #[test]
    fn test_replacement_chars_are_flagged() {
        let df = df!["name" => ["Jos\u{fffd}", "Anna", "Mar\u{fffd}a"]].unwrap();

        let issues = run(&EncodingDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, Some(2));
    }

    #[test]
    fn test_tabs_are_not_encoding_issues() {
        let df = df!["name" => ["a\tb", "c"]].unwrap();
        assert!(run(&EncodingDetector, &df).is_empty());
    }

    #[test]
    fn test_mixed_weight_units() {
        let df = df!["weight" => ["5kg", "11 lb", "7kg", "90%"]].unwrap();

        let issues = run(&MixedUnitDetector, &df);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].details["units"]["kg"], json!(2));
        assert_eq!(issues[0].details["units"]["lb"], json!(1));
    }

    #[test]
    fn test_single_unit_is_clean() {
        let df = df!["weight" => ["5kg", "7kg", "9kg"]].unwrap();
        assert!(run(&MixedUnitDetector, &df).is_empty());
    }
}
