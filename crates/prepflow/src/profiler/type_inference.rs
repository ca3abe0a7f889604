//! Semantic type inference for columns.

use crate::config::EngineConfig;
use crate::utils::{is_datetime_dtype, is_error_marker, is_numeric_dtype, is_numeric_string};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date pattern regexes, compiled once at startup. Order matters: the
/// prioritized list is also used by the wrong_date_format detector and the
/// date conversion transform.
pub(crate) static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("Invalid regex: MM/DD/YYYY"),
        Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("Invalid regex: DD-MM-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}").expect("Invalid regex: datetime"),
    ]
});

/// Whether a single string literal looks like a date.
pub(crate) fn is_date_like(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return false;
    }
    DATE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}

/// Semantic kind of a column, inferred from its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Datetime => "datetime",
            Self::Text => "text",
        }
    }
}

/// Infer the semantic kind of a single column.
///
/// Deterministic for a fixed configuration: numeric coercion first, then
/// datetime patterns, then the categorical-vs-text split on distinct-value
/// ratio. All-null and single-value columns default to categorical.
pub fn infer_kind(series: &Series, config: &EngineConfig) -> ColumnKind {
    let dtype = series.dtype();
    if is_numeric_dtype(dtype) {
        return ColumnKind::Numeric;
    }
    if is_datetime_dtype(dtype) {
        return ColumnKind::Datetime;
    }
    if dtype == &DataType::Boolean {
        return ColumnKind::Categorical;
    }

    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return ColumnKind::Categorical;
    }

    let values: Vec<String> = match crate::utils::non_null_string_values(&non_null) {
        Ok(v) => v,
        Err(_) => return ColumnKind::Categorical,
    };

    // Numeric coercion: count parseable literals, skipping error markers.
    let mut numeric = 0usize;
    let mut checked = 0usize;
    for value in &values {
        let trimmed = value.trim();
        if trimmed.is_empty() || is_error_marker(trimmed) {
            continue;
        }
        checked += 1;
        if is_numeric_string(trimmed) {
            numeric += 1;
        }
    }
    if checked > 0 && (numeric as f64 / checked as f64) >= config.numeric_fraction {
        return ColumnKind::Numeric;
    }

    // Datetime: prioritized pattern list over the same values.
    let date_like = values.iter().filter(|v| is_date_like(v)).count();
    if !values.is_empty() && (date_like as f64 / values.len() as f64) >= config.datetime_fraction {
        return ColumnKind::Datetime;
    }

    // Categorical vs text: low distinct ratio and a bounded distinct count.
    let distinct = {
        let mut sorted = values.clone();
        sorted.sort();
        sorted.dedup();
        sorted.len()
    };
    if distinct <= 1 {
        return ColumnKind::Categorical;
    }
    let unique_ratio = distinct as f64 / values.len() as f64;
    if unique_ratio < config.categorical_unique_ratio && distinct <= config.categorical_unique_cap {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    }
}

/// Infer kinds for every column of a dataset.
pub fn infer_kinds(df: &DataFrame, config: &EngineConfig) -> BTreeMap<String, ColumnKind> {
    df.get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            (series.name().to_string(), infer_kind(series, config))
        })
        .collect()
}
