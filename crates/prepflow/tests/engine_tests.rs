//! End-to-end tests for the analyze / preprocess / resample flow.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use prepflow::{
    ActionStatus, Analyzer, EngineConfig, ImbalanceResolver, IssueType, PreprocessAction,
    Preprocessor, ResampleMethod, Severity,
};
use std::collections::BTreeMap;

// ============================================================================
// Helper Functions
// ============================================================================

fn analyzer() -> Analyzer {
    Analyzer::default()
}

fn preprocessor() -> Preprocessor {
    Preprocessor::new(EngineConfig::default())
}

fn action(issue_type: IssueType, columns: &[&str], method: &str) -> PreprocessAction {
    PreprocessAction::new(
        issue_type,
        columns.iter().map(|c| c.to_string()).collect(),
        method,
    )
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().to_vec()
}

fn class_counts(df: &DataFrame, target: &str) -> BTreeMap<String, usize> {
    let series = df.column(target).unwrap().as_materialized_series();
    let mut counts = BTreeMap::new();
    for value in series.str().unwrap().into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

fn messy_df() -> DataFrame {
    df![
        "age" => [Some(25.0f64), None, Some(40.0), Some(25.0), Some(31.0)],
        "income" => [Some(30_000.0f64), Some(45_000.0), None, Some(30_000.0), Some(52_000.0)],
        "city" => [Some("NY"), Some("ny "), Some("LA"), Some("NY"), None],
    ]
    .unwrap()
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_analyze_outlier_anchor_case() {
    let df = df!["v" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 100.0]].unwrap();
    let result = analyzer().analyze(&df).unwrap();

    let outliers = result.issues_of_type(IssueType::Outliers);
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].count, Some(1));

    // cap clamps the flagged value to the same upper bound
    let (capped, applied) =
        preprocessor().preprocess(&df, &[action(IssueType::Outliers, &["v"], "cap")]);
    assert_eq!(applied[0].status, ActionStatus::Success);
    let upper = outliers[0].details["v"]["upper_bound"].as_f64().unwrap();
    assert_eq!(f64_column(&capped, "v")[5], Some(upper));
    assert!(
        analyzer()
            .analyze(&capped)
            .unwrap()
            .issues_of_type(IssueType::Outliers)
            .is_empty()
    );
}

#[test]
fn test_analyze_duplicate_percentage() {
    let df = df![
        "a" => [1i64, 2, 3, 1],
        "b" => ["x", "y", "z", "x"],
    ]
    .unwrap();
    let result = analyzer().analyze(&df).unwrap();

    let duplicates = result.issues_of_type(IssueType::Duplicates);
    assert_eq!(duplicates[0].count, Some(1));
    assert_eq!(duplicates[0].percentage, Some(100.0 / 4.0));
}

#[test]
fn test_total_issues_is_detector_sum() {
    let result = analyzer().analyze(&messy_df()).unwrap();

    assert_eq!(result.total_issues, result.issues.len());
    let by_severity: usize = result.summary.values().sum();
    assert_eq!(by_severity, result.total_issues);
}

#[test]
fn test_analysis_is_repeatable() {
    let df = messy_df();
    let first = analyzer().analyze(&df).unwrap();
    let second = analyzer().analyze(&df).unwrap();

    assert_eq!(first.total_issues, second.total_issues);
    let types = |r: &prepflow::AnalysisResult| {
        r.issues.iter().map(|i| i.issue_type).collect::<Vec<_>>()
    };
    assert_eq!(types(&first), types(&second));
}

#[test]
fn test_imbalance_anchor_case() {
    let mut labels = vec!["A"; 95];
    labels.extend(vec!["B"; 5]);
    let ids: Vec<i64> = (0..100).collect();
    let df = df!["target" => labels, "id" => ids].unwrap();

    let result = analyzer().analyze(&df).unwrap();
    let issues = result.issues_of_type(IssueType::ImbalancedData);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details["imbalance_ratio"].as_f64().unwrap(), 19.0);
}

// ============================================================================
// Preprocessing
// ============================================================================

#[test]
fn test_mean_fill_anchor_case() {
    let df = df!["v" => [Some(10.0f64), None, Some(30.0)]].unwrap();
    let (out, applied) =
        preprocessor().preprocess(&df, &[action(IssueType::MissingValues, &["v"], "mean")]);

    assert_eq!(applied[0].status, ActionStatus::Success);
    assert_eq!(out.height(), 3);
    assert_eq!(f64_column(&out, "v"), vec![Some(10.0), Some(20.0), Some(30.0)]);
}

#[test]
fn test_every_missing_method_clears_the_issue() {
    for method in ["mean", "median", "mode", "forward_fill", "backward_fill", "drop_rows"] {
        // interior null so directional fills always have a neighbour
        let df = df!["v" => [Some(10.0f64), None, Some(30.0), Some(10.0)]].unwrap();
        let (out, applied) =
            preprocessor().preprocess(&df, &[action(IssueType::MissingValues, &["v"], method)]);

        assert_eq!(applied[0].status, ActionStatus::Success, "method {method}");
        let reanalyzed = analyzer().analyze(&out).unwrap();
        assert!(
            reanalyzed.issues_of_type(IssueType::MissingValues).is_empty(),
            "method {method} left missing values behind"
        );
    }
}

#[test]
fn test_duplicate_removal_is_idempotent() {
    let df = df![
        "a" => [1i64, 1, 2],
        "b" => ["x", "x", "y"],
    ]
    .unwrap();

    let remove = [action(IssueType::Duplicates, &[], "remove")];
    let (once, _) = preprocessor().preprocess(&df, &remove);
    let (twice, _) = preprocessor().preprocess(&once, &remove);

    assert_eq!(once.height(), 2);
    assert!(twice.equals_missing(&once));
    assert!(
        analyzer()
            .analyze(&once)
            .unwrap()
            .issues_of_type(IssueType::Duplicates)
            .is_empty()
    );
}

#[test]
fn test_mixed_batch_applies_only_the_valid_action() {
    let df = df!["v" => [Some(10.0f64), None, Some(30.0)]].unwrap();
    let actions = [
        action(IssueType::MissingValues, &["v"], "mean"),
        action(IssueType::MissingValues, &["ghost"], "mean"),
    ];

    let (out, applied) = preprocessor().preprocess(&df, &actions);
    assert_eq!(applied[0].status, ActionStatus::Success);
    assert_eq!(applied[1].status, ActionStatus::Failed);
    assert!(applied[1].error.is_some());
    assert_eq!(f64_column(&out, "v")[1], Some(20.0));
}

#[test]
fn test_transforms_compose_sequentially() {
    let df = df!["v" => [Some(1.0f64), None, Some(3.0), Some(1.0), Some(200.0), Some(2.0), Some(2.5)]]
        .unwrap();
    let actions = [
        action(IssueType::MissingValues, &["v"], "median"),
        action(IssueType::Outliers, &["v"], "remove"),
    ];

    let (out, applied) = preprocessor().preprocess(&df, &actions);
    assert!(applied.iter().all(|a| a.status == ActionStatus::Success));
    assert_eq!(out.column("v").unwrap().null_count(), 0);
    let values: Vec<f64> = f64_column(&out, "v").into_iter().flatten().collect();
    assert!(values.iter().all(|v| *v < 200.0));
}

#[test]
fn test_fix_all_end_to_end() {
    let outcome = preprocessor().fix_all(&messy_df()).unwrap();

    assert!(outcome.applied.iter().all(|a| a.status == ActionStatus::Success));
    let nulls: usize = outcome
        .data
        .get_columns()
        .iter()
        .map(|c| c.null_count())
        .sum();
    assert_eq!(nulls, 0);
    assert!(!outcome.imbalance.has_imbalanced_data);

    let reanalyzed = analyzer().analyze(&outcome.data).unwrap();
    assert!(reanalyzed.issues_of_type(IssueType::MissingValues).is_empty());
    assert!(reanalyzed.issues_of_type(IssueType::Duplicates).is_empty());
    assert!(
        reanalyzed
            .issues_of_type(IssueType::CategoricalInconsistencies)
            .is_empty()
    );
}

// ============================================================================
// Resampling
// ============================================================================

fn imbalanced_df() -> DataFrame {
    let mut labels = vec!["A"; 95];
    labels.extend(vec!["B"; 5]);
    let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.5).collect();
    df!["x" => x, "target" => labels].unwrap()
}

#[test]
fn test_undersample_equalizes_with_fewer_rows() {
    let out = ImbalanceResolver::new(EngineConfig::default())
        .resolve(&imbalanced_df(), "target", ResampleMethod::Undersample)
        .unwrap();

    let counts = class_counts(&out, "target");
    assert_eq!(counts["A"], 5);
    assert_eq!(counts["B"], 5);
    assert_eq!(out.height(), 10);
}

#[test]
fn test_oversample_doubles_majority_total() {
    let out = ImbalanceResolver::new(EngineConfig::default())
        .resolve(&imbalanced_df(), "target", ResampleMethod::Oversample)
        .unwrap();

    let counts = class_counts(&out, "target");
    assert_eq!(counts["A"], 95);
    assert_eq!(counts["B"], 95);
    assert_eq!(out.height(), 190);
}

#[test]
fn test_smote_balances_and_stays_in_range() {
    let out = ImbalanceResolver::new(EngineConfig::default())
        .resolve(&imbalanced_df(), "target", ResampleMethod::Smote)
        .unwrap();

    let counts = class_counts(&out, "target");
    assert_eq!(counts["A"], counts["B"]);

    // synthetic feature values stay inside the class-B value range
    let targets: Vec<Option<&str>> = out
        .column("target")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    for (target, x) in targets.iter().zip(f64_column(&out, "x")) {
        if *target == Some("B") {
            let x = x.unwrap();
            assert!((47.5..=49.5).contains(&x));
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn test_report_round_trips_through_json() {
    let result = analyzer().analyze(&messy_df()).unwrap();
    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        parsed["total_issues"].as_u64().unwrap() as usize,
        result.total_issues
    );
    for issue in parsed["issues"].as_array().unwrap() {
        // snake_case tags and lowercase severities on the wire
        let tag = issue["type"].as_str().unwrap();
        assert!(tag.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        assert!(matches!(
            issue["severity"].as_str().unwrap(),
            "low" | "medium" | "high" | "critical"
        ));
    }
}

#[test]
fn test_actions_parse_from_wire_json() {
    let json = r#"[
        {"issue_type": "missing_values", "columns": ["v"], "method": "mean"},
        {"issue_type": "outliers", "columns": ["v"], "method": "cap",
         "parameters": {"note": 1}}
    ]"#;
    let actions: Vec<PreprocessAction> = serde_json::from_str(json).unwrap();

    assert_eq!(actions[0].issue_type, IssueType::MissingValues);
    assert_eq!(actions[1].method, "cap");
    assert_eq!(actions[1].parameters["note"], serde_json::json!(1));
}

#[test]
fn test_summary_orders_severities() {
    let result = analyzer().analyze(&messy_df()).unwrap();
    let keys: Vec<Severity> = result.summary.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical
        ]
    );
}
