//! Outlier handling.
//!
//! Bounds come from the same IQR computation the detector uses, so a
//! `cap` pass pulls exactly the flagged values inside the fences.

use super::{Params, filter_rows, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::utils::{iqr_bounds, numeric_values};
use polars::prelude::*;

/// Drop rows holding an out-of-fence value in any listed column.
///
/// Nulls are not outliers and survive the pass.
pub fn remove(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "remove")?;
    require_columns(df, columns)?;

    let mut keep = vec![true; df.height()];
    for column in columns {
        let series = df.column(column)?.as_materialized_series();
        let Some((lower, upper)) = iqr_bounds(series, config.outlier_iqr_multiplier)? else {
            continue;
        };
        for (i, value) in numeric_values(series)?.into_iter().enumerate() {
            if let Some(v) = value {
                if v < lower || v > upper {
                    keep[i] = false;
                }
            }
        }
    }
    filter_rows(df, &keep)
}

/// Clamp out-of-fence values to the nearest fence.
pub fn cap(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "cap")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let Some((lower, upper)) = iqr_bounds(&series, config.outlier_iqr_multiplier)? else {
            continue;
        };
        let capped: Vec<Option<f64>> = numeric_values(&series)?
            .into_iter()
            .map(|v| v.map(|v| v.clamp(lower, upper)))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), capped))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_cap_pulls_outlier_to_upper_fence() {
        let df = df!["v" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 100.0]].unwrap();
        let out = cap(&df, &columns(&["v"]), &HashMap::new(), &EngineConfig::default()).unwrap();

        let values = out.column("v").unwrap().f64().unwrap().to_vec();
        // fences are [-2.5, 9.5] for this column
        assert_eq!(values[5], Some(9.5));
        assert_eq!(values[..5], [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]);
    }

    #[test]
    fn test_remove_drops_only_outlier_rows() {
        let df = df![
            "v" => [Some(1.0f64), Some(2.0), None, Some(4.0), Some(5.0), Some(100.0)],
            "id" => [1i64, 2, 3, 4, 5, 6],
        ]
        .unwrap();
        let out =
            remove(&df, &columns(&["v"]), &HashMap::new(), &EngineConfig::default()).unwrap();

        assert_eq!(out.height(), 5);
        let ids: Vec<Option<i64>> = out.column("id").unwrap().i64().unwrap().to_vec();
        assert!(!ids.contains(&Some(6)));
        // the null row survives
        assert!(ids.contains(&Some(3)));
    }

    #[test]
    fn test_flat_column_is_left_alone() {
        let df = df!["v" => [5.0f64, 5.0, 5.0, 5.0]].unwrap();
        let out = cap(&df, &columns(&["v"]), &HashMap::new(), &EngineConfig::default()).unwrap();
        assert!(out.equals(&df));
    }
}
