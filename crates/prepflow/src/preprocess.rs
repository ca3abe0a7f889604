//! Action application and automatic fixing.

use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::profiler::{ColumnKind, infer_kinds};
use crate::quality::Analyzer;
use crate::transforms::TransformRegistry;
use crate::types::{
    AnalysisResult, AppliedAction, DataIssue, ImbalanceHint, IssueType, PreprocessAction,
};
use polars::prelude::*;
use tracing::{info, warn};

/// Result of an automatic fixing pass.
pub struct FixAllOutcome {
    pub data: DataFrame,
    pub applied: Vec<AppliedAction>,
    /// Imbalance is never fixed automatically; resampling needs an explicit
    /// target column, so it is surfaced here instead.
    pub imbalance: ImbalanceHint,
}

/// Fix order for the automatic pass. Deduplication first so later passes
/// see honest counts; row-dropping before value rewrites; column drops and
/// text cleanup last.
const FIX_ALL_ORDER: [(IssueType, &str); 11] = [
    (IssueType::Duplicates, "remove"),
    (IssueType::MissingValues, "mean"),
    (IssueType::Outliers, "cap"),
    (IssueType::CategoricalInconsistencies, "normalize"),
    (IssueType::Skewness, "log"),
    (IssueType::WrongDateFormat, "convert"),
    (IssueType::HighCardinality, "group_rare"),
    (IssueType::ConstantValues, "drop_column"),
    (IssueType::CorrelatedFeatures, "drop_one"),
    (IssueType::EncodingIssues, "clean"),
    (IssueType::NoisyText, "clean"),
];

/// Applies fix actions to datasets.
///
/// Transforms never mutate their input, so a failed action simply leaves
/// the working dataset at its previous state and the batch continues.
pub struct Preprocessor {
    config: EngineConfig,
    registry: TransformRegistry,
}

impl Preprocessor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: TransformRegistry::new(),
        }
    }

    /// Apply a batch of actions in order, recording the fate of each.
    pub fn preprocess(
        &self,
        df: &DataFrame,
        actions: &[PreprocessAction],
    ) -> (DataFrame, Vec<AppliedAction>) {
        let mut current = df.clone();
        let mut applied = Vec::with_capacity(actions.len());

        for action in actions {
            match self.apply(&current, action) {
                Ok(next) => {
                    info!(
                        issue_type = %action.issue_type,
                        method = %action.method,
                        "action applied"
                    );
                    current = next;
                    applied.push(AppliedAction::success(action));
                }
                Err(err) => {
                    warn!(
                        issue_type = %action.issue_type,
                        method = %action.method,
                        error = %err,
                        "action failed, dataset left unchanged"
                    );
                    applied.push(AppliedAction::failed(action, err.to_string()));
                }
            }
        }

        (current, applied)
    }

    fn apply(&self, df: &DataFrame, action: &PreprocessAction) -> Result<DataFrame> {
        let transform = self
            .registry
            .get(action.issue_type, &action.method)
            .ok_or_else(|| PrepError::UnknownMethod {
                issue_type: action.issue_type.to_string(),
                method: action.method.clone(),
            })?;
        transform(df, &action.columns, &action.parameters, &self.config)
    }

    /// Analyze the dataset and fix everything fixable with default methods.
    pub fn fix_all(&self, df: &DataFrame) -> Result<FixAllOutcome> {
        let analysis = Analyzer::new(self.config.clone()).analyze(df)?;
        let actions = self.plan_fixes(df, &analysis);
        let (data, applied) = self.preprocess(df, &actions);

        let imbalanced = analysis.issues_of_type(IssueType::ImbalancedData);
        let imbalance = ImbalanceHint {
            has_imbalanced_data: !imbalanced.is_empty(),
            candidate_targets: imbalanced
                .iter()
                .flat_map(|issue| issue.affected_columns.clone())
                .collect(),
        };

        Ok(FixAllOutcome {
            data,
            applied,
            imbalance,
        })
    }

    /// One action per detected fixable issue type, in `FIX_ALL_ORDER`.
    fn plan_fixes(&self, df: &DataFrame, analysis: &AnalysisResult) -> Vec<PreprocessAction> {
        let kinds = infer_kinds(df, &self.config);
        let mut actions = Vec::new();

        for (issue_type, method) in FIX_ALL_ORDER {
            let issues = analysis.issues_of_type(issue_type);
            if issues.is_empty() {
                continue;
            }

            match issue_type {
                IssueType::MissingValues => {
                    // numeric columns take the mean, everything else the mode
                    let columns = affected_columns(&issues);
                    let (numeric, other): (Vec<String>, Vec<String>) = columns
                        .into_iter()
                        .partition(|c| kinds.get(c) == Some(&ColumnKind::Numeric));
                    if !numeric.is_empty() {
                        actions.push(PreprocessAction::new(issue_type, numeric, method));
                    }
                    if !other.is_empty() {
                        actions.push(PreprocessAction::new(issue_type, other, "mode"));
                    }
                }
                IssueType::CorrelatedFeatures => {
                    actions.extend(correlated_pair_actions(&issues));
                }
                _ => {
                    actions.push(PreprocessAction::new(
                        issue_type,
                        affected_columns(&issues),
                        method,
                    ));
                }
            }
        }

        actions
    }
}

fn affected_columns(issues: &[&DataIssue]) -> Vec<String> {
    let mut columns = Vec::new();
    for issue in issues {
        for column in &issue.affected_columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// One `drop_one` action per correlated pair, skipping pairs whose second
/// column is already scheduled to be dropped.
fn correlated_pair_actions(issues: &[&DataIssue]) -> Vec<PreprocessAction> {
    let mut dropped: Vec<String> = Vec::new();
    let mut actions = Vec::new();

    for issue in issues {
        let Some(pairs) = issue.details.get("correlations").and_then(|v| v.as_array()) else {
            continue;
        };
        for pair in pairs {
            let (Some(first), Some(second)) = (
                pair.get("column_1").and_then(|v| v.as_str()),
                pair.get("column_2").and_then(|v| v.as_str()),
            ) else {
                continue;
            };
            if dropped.iter().any(|c| c == first || c == second) {
                continue;
            }
            dropped.push(second.to_string());
            actions.push(PreprocessAction::new(
                IssueType::CorrelatedFeatures,
                vec![first.to_string(), second.to_string()],
                "drop_one",
            ));
        }
    }
    actions
}
