//! Mixed numeric/text column detection.

use super::{ColumnKinds, Detector, detector_err, string_columns};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::{is_error_marker, is_numeric_string, non_null_string_values};
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Flags string columns that mix numeric literals with free text.
///
/// A column like `["1200", "error", "3400"]` usually started life numeric
/// and picked up sentinel strings on the way in. Error markers such as
/// "n/a" or "unknown" count as non-numeric evidence.
pub struct MixedTypeDetector;

impl Detector for MixedTypeDetector {
    fn name(&self) -> &'static str {
        "inconsistent_types"
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
            if values.is_empty() {
                continue;
            }

            let numeric = values
                .iter()
                .filter(|v| !is_error_marker(v) && is_numeric_string(v))
                .count();
            let non_numeric = values.len() - numeric;
            if numeric == 0 || non_numeric == 0 {
                continue;
            }

            issues.push(DataIssue {
                issue_type: IssueType::InconsistentTypes,
                severity: Severity::High,
                affected_columns: vec![name.clone()],
                description: format!(
                    "Column '{name}' mixes {numeric} numeric values with {non_numeric} non-numeric values"
                ),
                count: Some(non_numeric as u64),
                percentage: Some(non_numeric as f64 / values.len() as f64 * 100.0),
                details: HashMap::from([
                    ("numeric_values".to_string(), json!(numeric)),
                    ("non_numeric_values".to_string(), json!(non_numeric)),
                ]),
                recommended_actions: Vec::new(),
            });
        }

        Ok(issues)
    }
}
