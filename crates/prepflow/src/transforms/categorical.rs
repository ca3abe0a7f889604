//! Categorical cleanup and encoding.

use super::{Params, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::{canonical_label, string_values};
use polars::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

fn string_column<'a>(df: &'a DataFrame, column: &str, method: &str) -> Result<&'a Series> {
    let series = df.column(column)?.as_materialized_series();
    if series.dtype() != &DataType::String {
        return Err(PrepError::Validation(format!(
            "method '{method}' requires a string column, '{column}' is {}",
            series.dtype()
        )));
    }
    Ok(series)
}

/// Rewrite every label to its canonical form, collapsing spelling variants.
pub fn normalize(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "normalize")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = string_column(&out, column, "normalize")?.clone();
        let normalized: Vec<Option<String>> = string_values(&series)?
            .into_iter()
            .map(|v| v.map(|v| canonical_label(&v)))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), normalized))?;
    }
    Ok(out)
}

/// Replace labels with integer codes assigned in sorted label order.
pub fn label_encode(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "label_encode")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = string_column(&out, column, "label_encode")?.clone();
        let values = string_values(&series)?;

        let mut labels: Vec<&String> = values.iter().flatten().collect();
        labels.sort_unstable();
        labels.dedup();
        let codes: BTreeMap<&String, i64> = labels
            .iter()
            .enumerate()
            .map(|(code, label)| (*label, code as i64))
            .collect();

        let encoded: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.as_ref().map(|v| codes[v]))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), encoded))?;
    }
    Ok(out)
}

/// Expand a label column into one 0/1 indicator column per label.
///
/// Indicator columns are named `<column>_<label>` and appended in sorted
/// label order; the original column is dropped. A null row gets all zeros.
pub fn one_hot_encode(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "one_hot_encode")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = string_column(&out, column, "one_hot_encode")?.clone();
        let values = string_values(&series)?;

        let mut labels: Vec<String> = values.iter().flatten().cloned().collect();
        labels.sort_unstable();
        labels.dedup();

        out = out.drop(column)?;
        for label in labels {
            let indicator: Vec<i64> = values
                .iter()
                .map(|v| i64::from(v.as_deref() == Some(label.as_str())))
                .collect();
            let name = format!("{column}_{label}");
            out.with_column(Series::new(name.as_str().into(), indicator))?;
        }
    }
    Ok(out)
}

/// Replace labels rarer than the threshold fraction with "Other".
///
/// The threshold can be overridden per action via a `threshold` parameter.
pub fn group_rare(
    df: &DataFrame,
    columns: &[String],
    params: &Params,
    config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "group_rare")?;
    require_columns(df, columns)?;

    let threshold = params
        .get("threshold")
        .and_then(Value::as_f64)
        .unwrap_or(config.rare_category_fraction);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(PrepError::Validation(format!(
            "group_rare threshold must be within 0.0..=1.0, got {threshold}"
        )));
    }

    let mut out = df.clone();
    for column in columns {
        let series = string_column(&out, column, "group_rare")?.clone();
        let values = string_values(&series)?;

        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        let mut total = 0usize;
        for value in values.iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
            total += 1;
        }
        if total == 0 {
            continue;
        }

        let grouped: Vec<Option<String>> = values
            .iter()
            .map(|v| {
                v.as_ref().map(|v| {
                    if (counts[v] as f64) / (total as f64) < threshold {
                        "Other".to_string()
                    } else {
                        v.clone()
                    }
                })
            })
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), grouped))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    fn str_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        string_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_normalize_collapses_variants() {
        let df = df!["city" => ["NY", "ny ", "N.Y.", "LA"]].unwrap();
        let out = normalize(&df, &cols(&["city"]), &HashMap::new(), &EngineConfig::default())
            .unwrap();
        assert_eq!(
            str_column(&out, "city"),
            vec![
                Some("ny".into()),
                Some("ny".into()),
                Some("ny".into()),
                Some("la".into())
            ]
        );
    }

    #[test]
    fn test_label_encode_uses_sorted_label_order() {
        let df = df!["c" => [Some("b"), Some("a"), None, Some("c"), Some("a")]].unwrap();
        let out =
            label_encode(&df, &cols(&["c"]), &HashMap::new(), &EngineConfig::default()).unwrap();
        let values: Vec<Option<i64>> = out.column("c").unwrap().i64().unwrap().to_vec();
        assert_eq!(values, vec![Some(1), Some(0), None, Some(2), Some(0)]);
    }

    #[test]
    fn test_one_hot_replaces_column_with_indicators() {
        let df = df![
            "c" => [Some("b"), Some("a"), None],
            "x" => [1i64, 2, 3],
        ]
        .unwrap();
        let out =
            one_hot_encode(&df, &cols(&["c"]), &HashMap::new(), &EngineConfig::default()).unwrap();

        assert!(out.column("c").is_err());
        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>(),
            vec!["x", "c_a", "c_b"]
        );
        let a: Vec<Option<i64>> = out.column("c_a").unwrap().i64().unwrap().to_vec();
        assert_eq!(a, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_group_rare_respects_threshold_parameter() {
        let mut labels = vec!["common"; 8];
        labels.push("rare");
        labels.push("rare2");
        let df = df!["c" => labels].unwrap();

        let params = HashMap::from([("threshold".to_string(), json!(0.2))]);
        let out = group_rare(&df, &cols(&["c"]), &params, &EngineConfig::default()).unwrap();
        let values = str_column(&out, "c");
        assert_eq!(values.iter().filter(|v| v.as_deref() == Some("Other")).count(), 2);
        assert_eq!(
            values.iter().filter(|v| v.as_deref() == Some("common")).count(),
            8
        );
    }

    #[test]
    fn test_numeric_column_is_rejected() {
        let df = df!["v" => [1i64, 2]].unwrap();
        let err = normalize(&df, &cols(&["v"]), &HashMap::new(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, PrepError::Validation(_)));
    }
}
