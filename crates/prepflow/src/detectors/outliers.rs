//! IQR outlier detection.

use super::{ColumnKinds, Detector, columns_of_kind, detector_err};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::profiler::ColumnKind;
use crate::types::{DataIssue, IssueType, Severity};
use crate::utils::{iqr_bounds, numeric_values};
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Flags numeric values outside the Tukey fences.
///
/// A column is only scanned when it has at least 4 non-null values and a
/// non-zero interquartile range; the same bounds computation backs the
/// `cap` and `remove` transforms, so every flagged value is acted on.
pub struct OutlierDetector;

impl Detector for OutlierDetector {
    fn name(&self) -> &'static str {
        "outliers"
    }

    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>> {
        let mut affected = Vec::new();
        let mut details = HashMap::new();
        let mut total = 0u64;
        let mut scanned_cells = 0u64;

        for (name, series) in columns_of_kind(df, kinds, ColumnKind::Numeric) {
            let Some((lower, upper)) = iqr_bounds(series, config.outlier_iqr_multiplier)
                .map_err(detector_err(self.name()))?
            else {
                continue;
            };

            let values = numeric_values(series).map_err(detector_err(self.name()))?;
            scanned_cells += values.len() as u64;
            let count = values
                .iter()
                .flatten()
                .filter(|v| **v < lower || **v > upper)
                .count() as u64;
            if count == 0 {
                continue;
            }

            total += count;
            affected.push(name.clone());
            details.insert(
                name,
                json!({ "count": count, "lower_bound": lower, "upper_bound": upper }),
            );
        }

        if affected.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![DataIssue {
            issue_type: IssueType::Outliers,
            severity: Severity::Medium,
            description: format!(
                "Found {} outliers across {} numeric columns",
                total,
                affected.len()
            ),
            affected_columns: affected,
            count: Some(total),
            percentage: Some(total as f64 / scanned_cells.max(1) as f64 * 100.0),
            details,
            recommended_actions: vec!["remove".into(), "cap".into(), "log_transform".into()],
        }])
    }
}
