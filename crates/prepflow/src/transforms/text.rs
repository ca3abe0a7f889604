//! Text cleanup.

use super::{Params, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::string_values;
use polars::prelude::*;

fn rewrite_strings(
    df: &DataFrame,
    columns: &[String],
    method: &str,
    f: impl Fn(&str) -> String,
) -> Result<DataFrame> {
    require_some_columns(columns, method)?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        if series.dtype() != &DataType::String {
            return Err(PrepError::Validation(format!(
                "method '{method}' requires a string column, '{column}' is {}",
                series.dtype()
            )));
        }
        let rewritten: Vec<Option<String>> = string_values(&series)?
            .into_iter()
            .map(|v| v.map(|v| f(&v)))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), rewritten))?;
    }
    Ok(out)
}

/// Strip everything but letters, digits and single spaces.
///
/// Control and replacement characters go with the rest, so this also
/// repairs the columns the encoding detector flags.
pub fn clean(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    rewrite_strings(df, columns, "clean", |value| {
        let kept: String = value
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    })
}

/// Trim and lowercase every value.
pub fn lowercase(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    rewrite_strings(df, columns, "lowercase", |value| {
        value.trim().to_lowercase()
    })
}
