//! Detector orchestration.

use crate::config::EngineConfig;
use crate::detectors::{Detector, registry};
use crate::error::Result;
use crate::profiler::infer_kinds;
use crate::types::AnalysisResult;
use polars::prelude::*;
use tracing::{debug, info};

/// Runs the full detector registry over a dataset.
///
/// Analysis is a pure read; the dataset is never modified. A detector
/// failure aborts the whole run rather than returning a partial report,
/// since a report silently missing an issue class is worse than no report.
pub struct Analyzer {
    config: EngineConfig,
    detectors: Vec<Box<dyn Detector>>,
}

impl Analyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            detectors: registry(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a dataset and return every detected issue.
    pub fn analyze(&self, df: &DataFrame) -> Result<AnalysisResult> {
        let kinds = infer_kinds(df, &self.config);
        debug!(rows = df.height(), columns = df.width(), "analyzing dataset");

        let mut issues = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(df, &kinds, &self.config)?;
            if !found.is_empty() {
                debug!(detector = detector.name(), issues = found.len(), "issues found");
            }
            issues.extend(found);
        }

        let result = AnalysisResult::from_issues(issues);
        info!(total_issues = result.total_issues, "analysis complete");
        Ok(result)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
