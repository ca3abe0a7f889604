//! Shared series utilities used by the profiler, detectors, and transforms.

use polars::prelude::*;

// =============================================================================
// String parsing
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Common error/missing value markers in raw data.
pub const ERROR_MARKERS: [&str; 8] = [
    "error", "unknown", "n/a", "na", "null", "missing", "none", "#n/a",
];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a string is an error/missing value marker.
pub fn is_error_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a numeric value, tolerating common formatting
/// like currency symbols and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Series extraction
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Extract a series as `Vec<Option<f64>>`, casting numerics to Float64.
///
/// Returns an error for non-castable dtypes; nulls are preserved.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let chunked = float_series.f64()?;
    Ok(chunked.into_iter().collect())
}

/// Non-null numeric values of a series, order preserved.
pub fn non_null_numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Extract a series as `Vec<Option<String>>` via its string representation.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    if series.dtype() == &DataType::String {
        let chunked = series.str()?;
        Ok(chunked
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect())
    } else {
        let cast = series.cast(&DataType::String)?;
        let chunked = cast.str()?;
        Ok(chunked
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect())
    }
}

/// Non-null string values of a series.
pub fn non_null_string_values(series: &Series) -> PolarsResult<Vec<String>> {
    Ok(string_values(series)?.into_iter().flatten().collect())
}

/// Canonical form of a categorical label: trimmed, lowercased, with ASCII
/// punctuation stripped. Labels that agree here are treated as variants of
/// the same category.
pub fn canonical_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
}

// =============================================================================
// Statistics
// =============================================================================

/// Most frequent non-null value of a series, rendered as a string.
///
/// Ties break towards the value that appears first in the column.
pub fn series_mode(series: &Series) -> Option<String> {
    let values = non_null_string_values(series).ok()?;
    if values.is_empty() {
        return None;
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    for val in values {
        match counts.iter_mut().find(|(v, _)| *v == val) {
            Some((_, count)) => *count += 1,
            None => counts.push((val, 1)),
        }
    }
    // counts is in first-seen order; only a strictly larger count displaces
    // the current best, so ties keep the earlier value
    let mut best: Option<(String, usize)> = None;
    for (val, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((val, count)),
        }
    }
    best.map(|(val, _)| val)
}

/// Quantile of a pre-sorted slice using the sorted-index method.
pub fn sorted_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() as f64) * q) as usize;
    Some(sorted[idx.min(sorted.len() - 1)])
}

/// IQR-based outlier bounds for a numeric series.
///
/// Returns `None` when fewer than 4 non-null values exist or the IQR is zero
/// (a constant middle of the distribution makes the bounds degenerate).
pub fn iqr_bounds(series: &Series, multiplier: f64) -> PolarsResult<Option<(f64, f64)>> {
    let mut values = non_null_numeric_values(series)?;
    if values.len() < 4 {
        return Ok(None);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = sorted_quantile(&values, 0.25).unwrap_or(0.0);
    let q3 = sorted_quantile(&values, 0.75).unwrap_or(0.0);
    let iqr = q3 - q1;
    if iqr == 0.0 {
        return Ok(None);
    }

    Ok(Some((q1 - multiplier * iqr, q3 + multiplier * iqr)))
}

/// Adjusted Fisher-Pearson skewness coefficient (the pandas `skew()` formula).
///
/// Returns `None` for fewer than 3 values or zero variance.
pub fn sample_skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_f;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n_f;
    if m2 <= f64::EPSILON {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    let adjustment = (n_f * (n_f - 1.0)).sqrt() / (n_f - 2.0);
    Some(adjustment * g1)
}

/// Pearson correlation over pairwise-complete observations.
///
/// Rows where either value is null are skipped. Returns `None` when fewer
/// than 3 complete pairs exist or either side has zero variance.
pub fn pearson_correlation(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 3 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

// =============================================================================
// Series construction
// =============================================================================

/// Rebuild a numeric series with nulls replaced by a fill value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values = numeric_values(series)?;
    let filled: Vec<f64> = values
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Rebuild a string series with nulls replaced by a fill value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let values = string_values(series)?;
    let filled: Vec<String> = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Row-identity keys for duplicate detection.
///
/// Each row is rendered as its values' debug forms joined with a unit
/// separator, so nulls compare equal and column boundaries stay distinct.
pub fn row_keys(df: &DataFrame) -> PolarsResult<Vec<String>> {
    let height = df.height();
    let mut keys = vec![String::new(); height];
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        for (i, key) in keys.iter_mut().enumerate().take(height) {
            let value = series.get(i)?;
            key.push_str(&format!("{value:?}"));
            key.push('\u{1f}');
        }
    }
    Ok(keys)
}
