//! Textual-date conversion.

use super::{Params, replace_column, require_columns, require_some_columns};
use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::utils::string_values;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Formats tried in order when parsing a date-shaped string.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Rewrite a text date column into one canonical format.
///
/// The target format defaults to ISO `%Y-%m-%d` and can be overridden with
/// a `format` parameter. Values that match none of the known input formats
/// become null; the action fails instead when nothing at all parses, since
/// that means the column was misidentified.
pub fn convert(
    df: &DataFrame,
    columns: &[String],
    params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "convert")?;
    require_columns(df, columns)?;

    let target = params
        .get("format")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("%Y-%m-%d");

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let parsed = parse_column(&series, column)?;
        let canonical: Vec<Option<String>> = parsed
            .iter()
            .map(|v| v.as_ref().map(|dt| dt.format(target).to_string()))
            .collect();
        out = replace_column(&out, Series::new(column.as_str().into(), canonical))?;
    }
    Ok(out)
}

/// Split a text date column into `<column>_year`, `<column>_month` and
/// `<column>_day` integer columns; the original column is kept.
pub fn extract(
    df: &DataFrame,
    columns: &[String],
    _params: &Params,
    _config: &EngineConfig,
) -> Result<DataFrame> {
    require_some_columns(columns, "extract")?;
    require_columns(df, columns)?;

    let mut out = df.clone();
    for column in columns {
        let series = out.column(column)?.as_materialized_series().clone();
        let parsed = parse_column(&series, column)?;

        let years: Vec<Option<i32>> =
            parsed.iter().map(|v| v.as_ref().map(|dt| dt.year())).collect();
        let months: Vec<Option<i32>> = parsed
            .iter()
            .map(|v| v.as_ref().map(|dt| dt.month() as i32))
            .collect();
        let days: Vec<Option<i32>> = parsed
            .iter()
            .map(|v| v.as_ref().map(|dt| dt.day() as i32))
            .collect();

        for (suffix, values) in [("year", years), ("month", months), ("day", days)] {
            let name = format!("{column}_{suffix}");
            out.with_column(Series::new(name.as_str().into(), values))?;
        }
    }
    Ok(out)
}

fn parse_column(series: &Series, column: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    if series.dtype() != &DataType::String {
        return Err(PrepError::Validation(format!(
            "date conversion requires a string column, '{column}' is {}",
            series.dtype()
        )));
    }

    let parsed: Vec<Option<NaiveDateTime>> = string_values(series)?
        .into_iter()
        .map(|v| v.as_deref().and_then(parse_datetime))
        .collect();
    if parsed.iter().all(Option::is_none) {
        return Err(PrepError::computation(
            column,
            "no value matches a known date format",
        ));
    }
    Ok(parsed)
}
