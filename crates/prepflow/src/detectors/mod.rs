//! Issue detectors.
//!
//! Each detector is a pure read over the dataset: it inspects columns
//! (optionally restricted to a relevant [`ColumnKind`]) and emits zero or
//! more [`DataIssue`] records. Detectors never mutate the dataset and are
//! independent of each other, so the registry order only fixes the order of
//! the aggregated issue list, never its content.

mod categorical;
mod dates;
mod duplicates;
mod missing;
mod mixed_types;
mod numeric;
mod outliers;
mod text;

pub use categorical::{
    CategoricalInconsistencyDetector, ConstantValueDetector, HighCardinalityDetector,
    ImbalanceDetector,
};
pub use dates::DateFormatDetector;
pub use duplicates::DuplicateDetector;
pub use missing::MissingValueDetector;
pub use mixed_types::MixedTypeDetector;
pub use numeric::{CorrelationDetector, InvalidRangeDetector, SkewnessDetector};
pub use outliers::OutlierDetector;
pub use text::{EncodingDetector, MixedUnitDetector, NoisyTextDetector};

use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::profiler::ColumnKind;
use crate::types::DataIssue;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Per-column semantic kinds, as produced by [`crate::profiler::infer_kinds`].
pub type ColumnKinds = BTreeMap<String, ColumnKind>;

/// A single data-quality check.
pub trait Detector: Send + Sync {
    /// Stable identifier used in logs and detector-failure errors.
    fn name(&self) -> &'static str;

    /// Inspect the dataset and report issues. Must not mutate the dataset.
    fn detect(
        &self,
        df: &DataFrame,
        kinds: &ColumnKinds,
        config: &EngineConfig,
    ) -> Result<Vec<DataIssue>>;
}

/// The full detector set, in registry order.
///
/// One detector per issue type; the analyzer runs them all. Keeping the
/// registry explicit makes the closed issue-type set checkable at a glance.
pub fn registry() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(MissingValueDetector),
        Box::new(DuplicateDetector),
        Box::new(OutlierDetector),
        Box::new(ImbalanceDetector),
        Box::new(MixedTypeDetector),
        Box::new(CategoricalInconsistencyDetector),
        Box::new(InvalidRangeDetector),
        Box::new(SkewnessDetector),
        Box::new(HighCardinalityDetector),
        Box::new(ConstantValueDetector),
        Box::new(CorrelationDetector),
        Box::new(DateFormatDetector),
        Box::new(EncodingDetector),
        Box::new(MixedUnitDetector),
        Box::new(NoisyTextDetector),
    ]
}

/// Convert a polars failure inside a detector into a fatal detector error.
pub(crate) fn detector_err(name: &'static str) -> impl Fn(PolarsError) -> PrepError {
    move |e| PrepError::detector(name, e.to_string())
}

/// String-dtype columns of a dataset, in column order.
pub(crate) fn string_columns(df: &DataFrame) -> Vec<(String, Series)> {
    df.get_columns()
        .iter()
        .filter_map(|col| {
            let series = col.as_materialized_series();
            if series.dtype() == &DataType::String {
                Some((series.name().to_string(), series.clone()))
            } else {
                None
            }
        })
        .collect()
}

/// Columns whose inferred kind matches, in column order.
pub(crate) fn columns_of_kind<'a>(
    df: &'a DataFrame,
    kinds: &ColumnKinds,
    kind: ColumnKind,
) -> Vec<(String, &'a Series)> {
    df.get_columns()
        .iter()
        .filter_map(|col| {
            let series = col.as_materialized_series();
            let name = series.name().to_string();
            if kinds.get(&name) == Some(&kind) {
                Some((name, series))
            } else {
                None
            }
        })
        .collect()
}
