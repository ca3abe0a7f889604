//! Row and column removal.

use super::{Params, filter_rows, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::row_keys;
use polars::prelude::*;
use std::collections::HashSet;

/// Drop exact duplicate rows, keeping the first occurrence of each.
///
/// Applying it twice is a no-op; the column list is ignored because
/// duplicates are a whole-row property.
pub fn drop_duplicates(
    df: &DataFrame,
    _columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    let keys = row_keys(df)?;
    let mut seen = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = keys.iter().map(|key| seen.insert(key.as_str())).collect();
    filter_rows(df, &keep)
}

/// Drop the listed columns.
pub fn drop_columns(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "drop_column")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        out = out.drop(column)?;
    }
    Ok(out)
}

/// Drop all but the first of a correlated column group.
pub fn drop_one(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_columns(df, columns)?;
    if columns.len() < 2 {
        return Err(PrepError::Validation(
            "method 'drop_one' requires at least two columns".to_string(),
        ));
    }

    let mut out = df.clone();
    for column in &columns[1..] {
        out = out.drop(column)?;
    }
    Ok(out)
}
