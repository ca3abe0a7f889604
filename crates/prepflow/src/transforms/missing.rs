//! Missing-value fills.

use super::{Params, filter_rows, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, non_null_numeric_values, parse_numeric_string,
    series_mode, sorted_quantile,
};
use polars::prelude::*;

pub fn fill_mean(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    fill_statistic(df, columns, "mean", |values| {
        values.iter().sum::<f64>() / values.len() as f64
    })
}

pub fn fill_median(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    fill_statistic(df, columns, "median", |values| {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        // non-empty by the caller's check
        sorted_quantile(&sorted, 0.5).unwrap_or(sorted[0])
    })
}

/// Fill nulls in each column with a statistic of its non-null values.
///
/// The column is rebuilt as `Float64`, so numeric-looking string columns
/// come out properly typed as a side effect.
fn fill_statistic(
    df: &DataFrame,
    columns: &[String],
    method: &str,
    statistic: impl Fn(&[f64]) -> f64,
) -> Result<DataFrame> {
    require_some_columns(columns, method)?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let values = non_null_numeric_values(&series)?;
        if values.is_empty() {
            return Err(PrepError::computation(
                column,
                "no non-null numeric values to aggregate",
            ));
        }
        let fill = statistic(&values);
        out = replace_column(&out, fill_numeric_nulls(&series, fill)?)?;
    }
    Ok(out)
}

pub fn fill_mode(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "mode")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let Some(mode) = series_mode(&series) else {
            return Err(PrepError::computation(column, "no non-null values"));
        };

        let filled = if series.dtype() == &DataType::String {
            fill_string_nulls(&series, &mode)?
        } else {
            let value = parse_numeric_string(&mode).ok_or_else(|| {
                PrepError::computation(column, "mode is not numeric for a numeric column")
            })?;
            fill_numeric_nulls(&series, value)?
        };
        out = replace_column(&out, filled)?;
    }
    Ok(out)
}

pub fn forward_fill(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    fill_directional(df, columns, "forward_fill", FillNullStrategy::Forward(None))
}

pub fn backward_fill(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    fill_directional(df, columns, "backward_fill", FillNullStrategy::Backward(None))
}

/// Propagate neighbouring values into nulls. Leading (or trailing) nulls
/// have no neighbour on that side and stay null.
fn fill_directional(
    df: &DataFrame,
    columns: &[String],
    method: &str,
    strategy: FillNullStrategy,
) -> Result<DataFrame> {
    require_some_columns(columns, method)?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        out = replace_column(&out, series.fill_null(strategy)?)?;
    }
    Ok(out)
}

/// Drop every row with a null in any of the listed columns.
pub fn drop_rows(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "drop_rows")?;
    require_columns(df, columns)?;

    let mut keep = vec![true; df.height()];
    for column in columns {
        let series = df.column(column)?.as_materialized_series();
        for (i, is_null) in series.is_null().into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                keep[i] = false;
            }
        }
    }
    filter_rows(df, &keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::collections::HashMap;

    fn apply(
        f: super::super::TransformFn,
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<DataFrame> {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        f(df, &columns, &HashMap::new(), &EngineConfig::default())
    }

    #[test]
    fn test_mean_fill() {
        let df = df!["v" => [Some(10.0f64), None, Some(30.0)]].unwrap();
        let out = apply(fill_mean, &df, &["v"]).unwrap();
        let values: Vec<Option<f64>> = out.column("v").unwrap().f64().unwrap().to_vec();
        assert_eq!(values, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_median_fill_ignores_outlier_pull() {
        let df = df!["v" => [Some(1.0f64), Some(2.0), Some(3.0), Some(1000.0), None]].unwrap();
        let out = apply(fill_median, &df, &["v"]).unwrap();
        let values = out.column("v").unwrap().f64().unwrap().to_vec();
        assert_eq!(values[4], Some(3.0));
    }

    #[test]
    fn test_mode_fill_on_strings() {
        let df = df!["c" => [Some("a"), Some("b"), Some("a"), None]].unwrap();
        let out = apply(fill_mode, &df, &["c"]).unwrap();
        let values: Vec<Option<&str>> =
            out.column("c").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(values[3], Some("a"));
    }

    #[test]
    fn test_forward_fill_leaves_leading_null() {
        let df = df!["v" => [None, Some(1.0f64), None, Some(3.0)]].unwrap();
        let out = apply(forward_fill, &df, &["v"]).unwrap();
        let values = out.column("v").unwrap().f64().unwrap().to_vec();
        assert_eq!(values, vec![None, Some(1.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_backward_fill() {
        let df = df!["v" => [None, Some(1.0f64), None, Some(3.0)]].unwrap();
        let out = apply(backward_fill, &df, &["v"]).unwrap();
        let values = out.column("v").unwrap().f64().unwrap().to_vec();
        assert_eq!(values, vec![Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn test_drop_rows_only_checks_listed_columns() {
        let df = df![
            "a" => [Some(1i64), None, Some(3)],
            "b" => [None::<i64>, Some(2), Some(3)],
        ]
        .unwrap();
        let out = apply(drop_rows, &df, &["a"]).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn test_all_null_column_is_a_computation_error() {
        let df = df!["v" => [None::<f64>, None]].unwrap();
        let err = apply(fill_mean, &df, &["v"]).unwrap_err();
        assert!(matches!(err, PrepError::Computation { .. }));
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let df = df!["v" => [1.0f64]].unwrap();
        let err = apply(fill_mean, &df, &["missing"]).unwrap_err();
        assert!(matches!(err, PrepError::ColumnNotFound(_)));
    }
}
