use std::collections::BTreeMap;

use etl_common::{column_f64s, column_values};
use polars::prelude::{NamedFrom, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::set_f64_column;
use crate::cluster::KMeans;
use crate::error::Result;
use crate::state::TableState;
use crate::stats::{mean, observed};

pub const DEFAULT_N_CLUSTERS: usize = 5;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputeOptions {
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_n_clusters() -> usize {
    DEFAULT_N_CLUSTERS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for ImputeOptions {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_N_CLUSTERS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Fill nulls with statistics of similar rows.
///
/// Rows are partitioned by k-means over the numeric columns, each pre-filled
/// with its column mean. A numeric null then takes the mean of its cluster's
/// observed values; a categorical null takes the most frequent value in its
/// cluster (ties go to the smallest value). When a cluster has no observed
/// value for a column the null stays. Filled numeric columns become
/// `Float64`. A table without nulls in numeric or string columns is returned
/// unchanged.
pub fn impute_by_clustering(state: TableState, options: ImputeOptions) -> Result<TableState> {
    let numeric = state.numeric_columns();
    let categorical = state.categorical_columns();
    let has_nulls = |name: &String| {
        state
            .data
            .column(name)
            .is_ok_and(|column| column.null_count() > 0)
    };
    if !numeric.iter().chain(&categorical).any(has_nulls) {
        debug!(table = %state.name, "no missing values to impute");
        return Ok(state);
    }

    let height = state.height();
    let mut features: Vec<Vec<Option<f64>>> = Vec::with_capacity(numeric.len());
    for name in &numeric {
        features.push(column_f64s(&state.data, name)?);
    }
    // An all-null column has no mean and contributes 0 to every point.
    let means: Vec<f64> = features
        .iter()
        .map(|values| mean(&observed(values)).unwrap_or(0.0))
        .collect();
    let points: Vec<Vec<f64>> = (0..height)
        .map(|row| {
            features
                .iter()
                .zip(&means)
                .map(|(values, fill)| values[row].unwrap_or(*fill))
                .collect()
        })
        .collect();
    let assignments = if numeric.is_empty() {
        vec![0; height]
    } else {
        KMeans::new(options.n_clusters, options.seed).fit_predict(&points)
    };

    let mut data = state.data.clone();
    let mut filled = 0usize;
    for (name, values) in numeric.iter().zip(&features) {
        if values.iter().all(Option::is_some) {
            continue;
        }
        let mut sums: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (value, &cluster) in values.iter().zip(&assignments) {
            if let Some(v) = value {
                let entry = sums.entry(cluster).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
        let imputed: Vec<Option<f64>> = values
            .iter()
            .zip(&assignments)
            .map(|(value, cluster)| {
                value.or_else(|| {
                    let (sum, count) = sums.get(cluster)?;
                    filled += 1;
                    Some(sum / *count as f64)
                })
            })
            .collect();
        set_f64_column(&mut data, name, imputed)?;
    }

    for name in &categorical {
        let values = column_values(&state.data, name)?;
        if values.iter().all(|value| !value.is_null()) {
            continue;
        }
        let mut counts: BTreeMap<usize, BTreeMap<String, usize>> = BTreeMap::new();
        for (value, &cluster) in values.iter().zip(&assignments) {
            if let Some(text) = value.as_str() {
                *counts
                    .entry(cluster)
                    .or_default()
                    .entry(text.to_string())
                    .or_insert(0) += 1;
            }
        }
        let modes: BTreeMap<usize, &str> = counts
            .iter()
            .filter_map(|(cluster, tally)| mode(tally).map(|value| (*cluster, value)))
            .collect();
        let imputed: Vec<Option<String>> = values
            .iter()
            .zip(&assignments)
            .map(|(value, cluster)| match value.as_str() {
                Some(text) => Some(text.to_string()),
                None => {
                    let mode = modes.get(cluster)?;
                    filled += 1;
                    Some((*mode).to_string())
                }
            })
            .collect();
        data.with_column(Series::new(name.as_str().into(), imputed))?;
    }

    info!(
        table = %state.name,
        clusters = options.n_clusters.clamp(1, height.max(1)),
        filled,
        "imputed missing values by clustering"
    );
    Ok(state.with_data(data))
}

/// Most frequent value; ties go to the smallest.
fn mode(tally: &BTreeMap<String, usize>) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (value, &count) in tally {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value.as_str(), count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_prefers_smallest_on_tie() {
        let tally: BTreeMap<String, usize> = [("b", 2), ("a", 2), ("c", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(mode(&tally), Some("a"));
        assert_eq!(mode(&BTreeMap::new()), None);
    }
}
