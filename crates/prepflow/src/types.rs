//! Wire-contract types shared between issue detection and preprocessing.
//!
//! Issue and method identifiers are string enumerations passed verbatim from
//! analysis output back into preprocessing input, so the serde tags here are
//! the actual API the serving layer depends on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Ordinal quality-impact ranking of a detected issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of data-quality issue tags.
///
/// Detection output and preprocessing input share these tags verbatim;
/// adding a variant is a wire-contract change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingValues,
    Duplicates,
    Outliers,
    ImbalancedData,
    InconsistentTypes,
    CategoricalInconsistencies,
    InvalidRanges,
    Skewness,
    HighCardinality,
    ConstantValues,
    CorrelatedFeatures,
    WrongDateFormat,
    EncodingIssues,
    MixedUnits,
    NoisyText,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingValues => "missing_values",
            Self::Duplicates => "duplicates",
            Self::Outliers => "outliers",
            Self::ImbalancedData => "imbalanced_data",
            Self::InconsistentTypes => "inconsistent_types",
            Self::CategoricalInconsistencies => "categorical_inconsistencies",
            Self::InvalidRanges => "invalid_ranges",
            Self::Skewness => "skewness",
            Self::HighCardinality => "high_cardinality",
            Self::ConstantValues => "constant_values",
            Self::CorrelatedFeatures => "correlated_features",
            Self::WrongDateFormat => "wrong_date_format",
            Self::EncodingIssues => "encoding_issues",
            Self::MixedUnits => "mixed_units",
            Self::NoisyText => "noisy_text",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected data-quality problem with severity and evidence.
///
/// Immutable once created; each issue is produced by exactly one detector.
/// `details` holds the detector's free-form evidence (per-column counts,
/// outlier bounds, correlation pairs); each detector documents its key set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub affected_columns: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
}

/// Basic shape information about the analyzed dataset.
///
/// The serving layer merges this with its own file metadata (id, name, size)
/// before returning a response; the core only knows rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: usize,
}

/// Result of running the full detector registry over a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub issues: Vec<DataIssue>,
    pub total_issues: usize,
    /// Issue count per severity; always contains all four severities.
    pub summary: BTreeMap<Severity, usize>,
}

impl AnalysisResult {
    /// Build a result from a flat issue list, computing the severity summary.
    pub fn from_issues(issues: Vec<DataIssue>) -> Self {
        let mut summary: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for issue in &issues {
            *summary.entry(issue.severity).or_insert(0) += 1;
        }
        Self {
            total_issues: issues.len(),
            issues,
            summary,
        }
    }

    /// Issues of a given type, in detection order.
    pub fn issues_of_type(&self, issue_type: IssueType) -> Vec<&DataIssue> {
        self.issues
            .iter()
            .filter(|i| i.issue_type == issue_type)
            .collect()
    }
}

/// A requested transformation, user- or policy-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessAction {
    pub issue_type: IssueType,
    pub columns: Vec<String>,
    pub method: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl PreprocessAction {
    pub fn new(issue_type: IssueType, columns: Vec<String>, method: impl Into<String>) -> Self {
        Self {
            issue_type,
            columns,
            method: method.into(),
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Outcome of a single requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Failed,
    Skipped,
}

/// Per-action outcome record; one per requested action, order preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedAction {
    pub issue_type: IssueType,
    pub columns: Vec<String>,
    pub method: String,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AppliedAction {
    pub fn success(action: &PreprocessAction) -> Self {
        Self {
            issue_type: action.issue_type,
            columns: action.columns.clone(),
            method: action.method.clone(),
            status: ActionStatus::Success,
            error: None,
        }
    }

    pub fn failed(action: &PreprocessAction, error: impl Into<String>) -> Self {
        Self {
            issue_type: action.issue_type,
            columns: action.columns.clone(),
            method: action.method.clone(),
            status: ActionStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Imbalance finding surfaced by fix-all instead of being resolved
/// automatically; resampling needs a user-chosen target column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImbalanceHint {
    pub has_imbalanced_data: bool,
    pub candidate_targets: Vec<String>,
}

/// Resampling strategy for an imbalanced target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleMethod {
    Smote,
    Oversample,
    Undersample,
}

impl ResampleMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smote => "smote",
            Self::Oversample => "oversample",
            Self::Undersample => "undersample",
        }
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_snake_case_tags() {
        let json = serde_json::to_string(&IssueType::MissingValues).unwrap();
        assert_eq!(json, "\"missing_values\"");
        let json = serde_json::to_string(&IssueType::CategoricalInconsistencies).unwrap();
        assert_eq!(json, "\"categorical_inconsistencies\"");
        let json = serde_json::to_string(&IssueType::WrongDateFormat).unwrap();
        assert_eq!(json, "\"wrong_date_format\"");
    }

    #[test]
    fn test_issue_type_roundtrip_matches_as_str() {
        let all = [
            IssueType::MissingValues,
            IssueType::Duplicates,
            IssueType::Outliers,
            IssueType::ImbalancedData,
            IssueType::InconsistentTypes,
            IssueType::CategoricalInconsistencies,
            IssueType::InvalidRanges,
            IssueType::Skewness,
            IssueType::HighCardinality,
            IssueType::ConstantValues,
            IssueType::CorrelatedFeatures,
            IssueType::WrongDateFormat,
            IssueType::EncodingIssues,
            IssueType::MixedUnits,
            IssueType::NoisyText,
        ];
        for issue_type in all {
            let json = serde_json::to_string(&issue_type).unwrap();
            assert_eq!(json, format!("\"{}\"", issue_type.as_str()));
            let back: IssueType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, issue_type);
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_analysis_result_summary_zero_filled() {
        let result = AnalysisResult::from_issues(vec![]);
        assert_eq!(result.total_issues, 0);
        assert_eq!(result.summary.len(), 4);
        assert_eq!(result.summary[&Severity::Critical], 0);
    }

    #[test]
    fn test_analysis_result_summary_counts() {
        let issue = |severity| DataIssue {
            issue_type: IssueType::MissingValues,
            severity,
            affected_columns: vec![],
            description: String::new(),
            count: None,
            percentage: None,
            details: HashMap::new(),
            recommended_actions: vec![],
        };
        let result = AnalysisResult::from_issues(vec![
            issue(Severity::Low),
            issue(Severity::Low),
            issue(Severity::High),
        ]);
        assert_eq!(result.total_issues, 3);
        assert_eq!(result.summary[&Severity::Low], 2);
        assert_eq!(result.summary[&Severity::High], 1);
        assert_eq!(result.summary[&Severity::Medium], 0);
    }

    #[test]
    fn test_preprocess_action_from_frontend_json() {
        let json = r#"{
            "issue_type": "missing_values",
            "columns": ["age", "fare"],
            "method": "mean"
        }"#;
        let action: PreprocessAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.issue_type, IssueType::MissingValues);
        assert_eq!(action.columns, vec!["age", "fare"]);
        assert_eq!(action.method, "mean");
        assert!(action.parameters.is_empty());
    }

    #[test]
    fn test_applied_action_serialization() {
        let action = PreprocessAction::new(IssueType::Duplicates, vec![], "remove");
        let applied = AppliedAction::success(&action);
        let json = serde_json::to_string(&applied).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(!json.contains("\"error\""));

        let failed = AppliedAction::failed(&action, "boom");
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("boom"));
    }

    #[test]
    fn test_resample_method_tags() {
        assert_eq!(serde_json::to_string(&ResampleMethod::Smote).unwrap(), "\"smote\"");
        let back: ResampleMethod = serde_json::from_str("\"undersample\"").unwrap();
        assert_eq!(back, ResampleMethod::Undersample);
    }
}
