//! Distribution-reshaping transforms.
//!
//! All three shift the column so its minimum maps to 1 before applying the
//! monotone transform, which keeps them defined for zero and negative data.

use super::{Params, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;

/// Lambda grid searched by the Box-Cox fit.
const BOX_COX_LAMBDA_STEPS: i32 = 41;

pub fn log_transform(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    shifted_transform(df, columns, "log", |v, min| (v - min + 1.0).ln_1p())
}

pub fn sqrt_transform(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    shifted_transform(df, columns, "sqrt", |v, min| (v - min + 1.0).sqrt())
}

fn shifted_transform(
    df: &DataFrame,
    columns: &[String],
    method: &str,
    f: impl Fn(f64, f64) -> f64,
) -> Result<DataFrame> {
    require_some_columns(columns, method)?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let values = numeric_values(&series)?;
        let Some(min) = values
            .iter()
            .flatten()
            .copied()
            .reduce(f64::min)
        else {
            return Err(PrepError::computation(column, "no non-null numeric values"));
        };

        let transformed: Vec<Option<f64>> =
            values.into_iter().map(|v| v.map(|v| f(v, min))).collect();
        out = replace_column(&out, Series::new(column.as_str().into(), transformed))?;
    }
    Ok(out)
}

/// Box-Cox with the power parameter fitted by maximum likelihood over a
/// lambda grid on [-2, 2].
pub fn box_cox_transform(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "box_cox")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let values = numeric_values(&series)?;
        let non_null: Vec<f64> = values.iter().flatten().copied().collect();
        if non_null.len() < 3 {
            return Err(PrepError::computation(
                column,
                "box_cox needs at least 3 non-null values",
            ));
        }

        let min = non_null.iter().copied().fold(f64::INFINITY, f64::min);
        let shifted: Vec<f64> = non_null.iter().map(|v| v - min + 1.0).collect();
        let lambda = fit_lambda(&shifted);

        let transformed: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.map(|v| box_cox(v - min + 1.0, lambda)))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), transformed))?;
    }
    Ok(out)
}

fn box_cox(y: f64, lambda: f64) -> f64 {
    if lambda.abs() < 1e-9 {
        y.ln()
    } else {
        (y.powf(lambda) - 1.0) / lambda
    }
}

/// Maximize the Box-Cox log-likelihood over the lambda grid.
///
/// llf(lambda) = (lambda - 1) * sum(ln y) - n/2 * ln(var(z)), with z the
/// transformed sample. Inputs are strictly positive by construction.
fn fit_lambda(shifted: &[f64]) -> f64 {
    let n = shifted.len() as f64;
    let log_sum: f64 = shifted.iter().map(|y| y.ln()).sum();

    let mut best = (f64::NEG_INFINITY, 1.0);
    for step in 0..BOX_COX_LAMBDA_STEPS {
        let lambda = -2.0 + 0.1 * step as f64;
        let z: Vec<f64> = shifted.iter().map(|y| box_cox(*y, lambda)).collect();
        let mean = z.iter().sum::<f64>() / n;
        let variance = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        if variance <= 0.0 {
            continue;
        }
        let llf = (lambda - 1.0) * log_sum - n / 2.0 * variance.ln();
        if llf > best.0 {
            best = (llf, lambda);
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::sample_skewness;
    use std::collections::HashMap;

    fn apply(f: super::super::TransformFn, df: &DataFrame) -> DataFrame {
        f(
            df,
            &["v".to_string()],
            &HashMap::new(),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    fn column_values(df: &DataFrame) -> Vec<f64> {
        df.column("v")
            .unwrap()
            .f64()
            .unwrap()
            .to_vec()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_log_reduces_right_skew() {
        let df = df!["v" => [1.0f64, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0, 300.0, 900.0]].unwrap();
        let before = sample_skewness(&column_values(&df)).unwrap();
        let after = sample_skewness(&column_values(&apply(log_transform, &df))).unwrap();
        assert!(after.abs() < before.abs());
    }

    #[test]
    fn test_log_handles_negative_values() {
        let df = df!["v" => [-5.0f64, 0.0, 10.0]].unwrap();
        let values = column_values(&apply(log_transform, &df));
        // min shifts to 1, so the smallest output is ln(2)
        assert_eq!(values[0], 2.0f64.ln());
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sqrt_is_monotone() {
        let df = df!["v" => [1.0f64, 4.0, 9.0, 16.0]].unwrap();
        let values = column_values(&apply(sqrt_transform, &df));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(values[0], 1.0);
    }

    #[test]
    fn test_box_cox_reduces_right_skew() {
        let df = df!["v" => [1.0f64, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0, 300.0, 900.0]].unwrap();
        let before = sample_skewness(&column_values(&df)).unwrap();
        let after = sample_skewness(&column_values(&apply(box_cox_transform, &df))).unwrap();
        assert!(after.abs() < before.abs());
    }

    #[test]
    fn test_nulls_stay_null() {
        let df = df!["v" => [Some(1.0f64), None, Some(10.0)]].unwrap();
        let out = apply(log_transform, &df);
        assert_eq!(out.column("v").unwrap().null_count(), 1);
    }
}
