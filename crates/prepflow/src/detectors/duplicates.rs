//! Exact duplicate-row detection.

use super::{ColumnKinds, Detector, detector_err};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{DataIssue, IssueType};
use crate::utils::row_keys;
use polars::prelude::*;
use serde_json::json;
use std::collections::HashMap;

/// Flags rows that are exact copies of an earlier row.
///
/// The first occurrence of each row is not counted, so the reported count
/// equals the number of rows a `duplicates`/`remove` pass would drop.
pub struct DuplicateDetector;

impl Detector for DuplicateDetector {
    fn name(&self) -> &'static str {
        "duplicates"
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

        let keys = row_keys(df).map_err(detector_err(self.name()))?;
        let mut seen: HashMap<&str, u64> = HashMap::with_capacity(height);
        let mut duplicate_rows = 0u64;
        for key in &keys {
            let count = seen.entry(key.as_str()).or_insert(0);
            if *count > 0 {
                duplicate_rows += 1;
            }
            *count += 1;
        }

        if duplicate_rows == 0 {
            return Ok(Vec::new());
        }

        let fraction = duplicate_rows as f64 / height as f64;
        Ok(vec![DataIssue {
            issue_type: IssueType::Duplicates,
            severity: config.severity_for_fraction(fraction),
            affected_columns: df
                .get_column_names()
                .iter()
                .map(|n| n.to_string())
                .collect(),
            description: format!("Found {duplicate_rows} duplicate rows"),
            count: Some(duplicate_rows),
            percentage: Some(fraction * 100.0),
            details: HashMap::from([("duplicate_rows".to_string(), json!(duplicate_rows))]),
            recommended_actions: vec!["remove".into()],
        }])
    }
}
