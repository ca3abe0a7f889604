//! Class-imbalance resampling.
//!
//! Resampling rewrites the row set, so unlike the fix transforms it is
//! never applied automatically; the caller names the target column and
//! method explicitly. All methods run on a seeded generator, so the same
//! input yields the same output.

use crate::config::EngineConfig;
use crate::error::{PrepError, Result};
use crate::types::ResampleMethod;
use crate::utils::{is_numeric_dtype, numeric_values, string_values};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::info;

pub struct ImbalanceResolver {
    config: EngineConfig,
}

impl ImbalanceResolver {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resample the dataset so every class of the target column has equal
    /// support. Rows with a null target are left alone.
    pub fn resolve(
        &self,
        df: &DataFrame,
        target: &str,
        method: ResampleMethod,
    ) -> Result<DataFrame> {
        if df.column(target).is_err() {
            return Err(PrepError::Configuration(format!(
                "target column '{target}' not found in dataset"
            )));
        }

        let classes = class_indices(df, target)?;
        if classes.len() < 2 {
            return Err(PrepError::Configuration(format!(
                "target column '{target}' has fewer than 2 classes"
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.config.resample_seed);
        let out = match method {
            ResampleMethod::Undersample => undersample(df, &classes, &mut rng)?,
            ResampleMethod::Oversample => oversample(df, &classes, &mut rng)?,
            ResampleMethod::Smote => {
                smote(df, target, &classes, self.config.smote_neighbors, &mut rng)?
            }
        };

        info!(
            target,
            method = method.as_str(),
            rows_before = df.height(),
            rows_after = out.height(),
            "resampled dataset"
        );
        Ok(out)
    }
}

/// Row indices per class label, plus the rows with a null target.
fn class_indices(df: &DataFrame, target: &str) -> Result<BTreeMap<String, Vec<IdxSize>>> {
    let series = df.column(target)?.as_materialized_series();
    let mut classes: BTreeMap<String, Vec<IdxSize>> = BTreeMap::new();
    for (i, value) in string_values(series)?.into_iter().enumerate() {
        if let Some(label) = value {
            classes.entry(label).or_default().push(i as IdxSize);
        }
    }
    Ok(classes)
}

fn null_target_indices(df: &DataFrame, classes: &BTreeMap<String, Vec<IdxSize>>) -> Vec<IdxSize> {
    let classed: usize = classes.values().map(Vec::len).sum();
    if classed == df.height() {
        return Vec::new();
    }
    let mut in_class = vec![false; df.height()];
    for idx in classes.values().flatten() {
        in_class[*idx as usize] = true;
    }
    (0..df.height() as IdxSize)
        .filter(|i| !in_class[*i as usize])
        .collect()
}

fn take_rows(df: &DataFrame, mut indices: Vec<IdxSize>) -> Result<DataFrame> {
    indices.sort_unstable();
    let idx = IdxCa::from_vec("idx".into(), indices);
    Ok(df.take(&idx)?)
}

/// Randomly thin every class down to the minority count.
fn undersample(
    df: &DataFrame,
    classes: &BTreeMap<String, Vec<IdxSize>>,
    rng: &mut StdRng,
) -> Result<DataFrame> {
    let minority = classes.values().map(Vec::len).min().unwrap_or(0);

    let mut kept = null_target_indices(df, classes);
    for indices in classes.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(rng);
        kept.extend(&shuffled[..minority]);
    }
    take_rows(df, kept)
}

/// Duplicate minority rows (with replacement) up to the majority count.
fn oversample(
    df: &DataFrame,
    classes: &BTreeMap<String, Vec<IdxSize>>,
    rng: &mut StdRng,
) -> Result<DataFrame> {
    let majority = classes.values().map(Vec::len).max().unwrap_or(0);

    let mut kept: Vec<IdxSize> = (0..df.height() as IdxSize).collect();
    for indices in classes.values() {
        for _ in indices.len()..majority {
            kept.push(indices[rng.gen_range(0..indices.len())]);
        }
    }
    take_rows(df, kept)
}

/// Synthesize minority rows by interpolating numeric features between a
/// class member and one of its k nearest same-class neighbours.
///
/// Non-numeric features are copied from the base row; a single-member
/// class degenerates into duplicating that member.
fn smote(
    df: &DataFrame,
    target: &str,
    classes: &BTreeMap<String, Vec<IdxSize>>,
    neighbors: usize,
    rng: &mut StdRng,
) -> Result<DataFrame> {
    let feature_names: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .filter(|s| s.name().as_str() != target && is_numeric_dtype(s.dtype()))
        .map(|s| s.name().to_string())
        .collect();
    if feature_names.is_empty() {
        return Err(PrepError::Configuration(format!(
            "smote needs at least one numeric feature besides '{target}'; use 'oversample' instead"
        )));
    }

    // interpolation produces floats, so the feature columns become Float64
    let mut out = df.clone();
    let mut features: Vec<Vec<Option<f64>>> = Vec::with_capacity(feature_names.len());
    for name in &feature_names {
        let series = out.column(name)?.as_materialized_series().clone();
        let values = numeric_values(&series)?;
        out.replace(name, Series::new(name.as_str().into(), values.clone()))?;
        features.push(values);
    }

    let majority = classes.values().map(Vec::len).max().unwrap_or(0);
    let mut base_indices: Vec<IdxSize> = Vec::new();
    let mut synth_features: Vec<Vec<Option<f64>>> = vec![Vec::new(); feature_names.len()];

    for indices in classes.values() {
        let k = neighbors.min(indices.len().saturating_sub(1));
        for _ in indices.len()..majority {
            let base = indices[rng.gen_range(0..indices.len())];
            let neighbor = if k == 0 {
                base
            } else {
                let mut ranked: Vec<IdxSize> = indices
                    .iter()
                    .copied()
                    .filter(|idx| *idx != base)
                    .collect();
                ranked.sort_by(|a, b| {
                    distance(&features, base, *a).total_cmp(&distance(&features, base, *b))
                });
                ranked[rng.gen_range(0..k)]
            };

            let t: f64 = rng.r#gen();
            base_indices.push(base);
            for (feature, synth) in features.iter().zip(synth_features.iter_mut()) {
                let value = match (feature[base as usize], feature[neighbor as usize]) {
                    (Some(b), Some(n)) => Some(b + t * (n - b)),
                    (b, _) => b,
                };
                synth.push(value);
            }
        }
    }

    if base_indices.is_empty() {
        return Ok(out);
    }

    let idx = IdxCa::from_vec("idx".into(), base_indices);
    let mut synth_df = out.take(&idx)?;
    for (name, values) in feature_names.iter().zip(synth_features) {
        synth_df.replace(name, Series::new(name.as_str().into(), values))?;
    }
    Ok(out.vstack(&synth_df)?)
}

/// Euclidean distance over the features where both rows are non-null.
fn distance(features: &[Vec<Option<f64>>], a: IdxSize, b: IdxSize) -> f64 {
    features
        .iter()
        .filter_map(|f| match (f[a as usize], f[b as usize]) {
            (Some(x), Some(y)) => Some((x - y).powi(2)),
            _ => None,
        })
        .sum::<f64>()
        .sqrt()
}
