//! Fix transforms.
//!
//! Every transform is a pure function from one dataset to a new one; the
//! input is never mutated, so a failed action can simply be skipped while
//! the caller keeps working with the previous dataset. The registry keys
//! transforms by `(issue type, method)`, the same pair the preprocess wire
//! format carries.

mod categorical;
mod dates;
mod missing;
mod numeric;
mod outliers;
mod structural;
mod text;

use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::types::IssueType;
use polars::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

/// Free-form per-action parameters from the wire request.
pub type Params = HashMap<String, Value>;

/// A registered fix: dataset in, dataset out.
pub type TransformFn = fn(&DataFrame, &[String], &Params, &EngineConfig) -> Result<DataFrame>;

/// Lookup table from `(issue type, method)` to the transform implementing it.
pub struct TransformRegistry {
    entries: HashMap<(IssueType, &'static str), TransformFn>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        let mut entries: HashMap<(IssueType, &'static str), TransformFn> = HashMap::new();
        let mut add = |issue_type, method, f: TransformFn| {
            entries.insert((issue_type, method), f);
        };

        add(IssueType::MissingValues, "mean", missing::fill_mean);
        add(IssueType::MissingValues, "median", missing::fill_median);
        add(IssueType::MissingValues, "mode", missing::fill_mode);
        add(IssueType::MissingValues, "forward_fill", missing::forward_fill);
        add(IssueType::MissingValues, "backward_fill", missing::backward_fill);
        add(IssueType::MissingValues, "drop_rows", missing::drop_rows);

        add(IssueType::Duplicates, "remove", structural::drop_duplicates);

        add(IssueType::Outliers, "remove", outliers::remove);
        add(IssueType::Outliers, "cap", outliers::cap);
        add(IssueType::Outliers, "log_transform", numeric::log_transform);

        add(
            IssueType::CategoricalInconsistencies,
            "normalize",
            categorical::normalize,
        );
        add(
            IssueType::CategoricalInconsistencies,
            "label_encode",
            categorical::label_encode,
        );
        add(
            IssueType::CategoricalInconsistencies,
            "one_hot_encode",
            categorical::one_hot_encode,
        );

        add(IssueType::WrongDateFormat, "convert", dates::convert);
        add(IssueType::WrongDateFormat, "extract", dates::extract);

        add(IssueType::Skewness, "log", numeric::log_transform);
        add(IssueType::Skewness, "sqrt", numeric::sqrt_transform);
        add(IssueType::Skewness, "box_cox", numeric::box_cox_transform);

        add(IssueType::HighCardinality, "group_rare", categorical::group_rare);
        add(IssueType::ConstantValues, "drop_column", structural::drop_columns);
        add(IssueType::CorrelatedFeatures, "drop_one", structural::drop_one);

        add(IssueType::NoisyText, "clean", text::clean);
        add(IssueType::NoisyText, "lowercase", text::lowercase);
        add(IssueType::EncodingIssues, "clean", text::clean);
        add(IssueType::EncodingIssues, "lowercase", text::lowercase);

        Self { entries }
    }

    /// Look up the transform for an issue/method pair.
    pub fn get(&self, issue_type: IssueType, method: &str) -> Option<TransformFn> {
        self.entries.get(&(issue_type, method)).copied()
    }

    /// Methods registered for an issue type, sorted for stable output.
    pub fn methods_for(&self, issue_type: IssueType) -> Vec<&'static str> {
        let mut methods: Vec<&'static str> = self
            .entries
            .keys()
            .filter(|(it, _)| *it == issue_type)
            .map(|(_, m)| *m)
            .collect();
        methods.sort_unstable();
        methods
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject actions that name columns missing from the dataset.
pub(crate) fn require_columns(df: &DataFrame, columns: &[String]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(PrepError::ColumnNotFound(column.clone()));
        }
    }
    Ok(())
}

/// Reject actions with an empty column list.
pub(crate) fn require_some_columns(columns: &[String], method: &str) -> Result<()> {
    if columns.is_empty() {
        return Err(PrepError::Validation(format!(
            "method '{method}' requires at least one column"
        )));
    }
    Ok(())
}

/// Replace a column in a dataset, preserving column order.
pub(crate) fn replace_column(df: &DataFrame, series: Series) -> Result<DataFrame> {
    let name = series.name().to_string();
    let mut out = df.clone();
    out.replace(&name, series)?;
    Ok(out)
}

/// Keep only the rows where `mask` is true.
pub(crate) fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(df.filter(&mask)?)
}
