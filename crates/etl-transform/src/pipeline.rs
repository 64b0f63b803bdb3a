//! Declarative transform pipelines.
//!
//! A pipeline is an ordered list of [`Stage`]s folded over a [`TableState`].
//! Pipelines are usually declared in TOML:
//!
//! ```toml
//! name = "orders"
//!
//! [tables]
//! users = "users.csv"
//!
//! [[step]]
//! type = "dedupe"
//!
//! [[step]]
//! type = "impute"
//! n_clusters = 3
//!
//! [[step]]
//! type = "filter"
//! condition = "quantity > 0"
//!
//! [[step]]
//! type = "enrich"
//! table = "users"
//! on = "user_id"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::error::{Result, TransformError};
use crate::relational::{AggFunc, Predicate, aggregate, enrich, filter};
use crate::stages::{
    DEFAULT_N_CLUSTERS, DEFAULT_SEED, DEFAULT_Z_THRESHOLD, ImputeOptions, deduplicate,
    encode_categorical, filter_outliers, impute_by_clustering, missing_report, normalize,
    standardize, uppercase_text,
};
use crate::state::TableState;

/// One transform step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    Dedupe,
    Impute {
        #[serde(default = "default_n_clusters")]
        n_clusters: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    Normalize,
    Standardize,
    Encode,
    Outliers {
        #[serde(default = "default_z_threshold")]
        z_threshold: f64,
    },
    Uppercase,
    /// Replace the table with its per-column null counts.
    CheckMissing,
    Aggregate {
        group_by: String,
        column: String,
        func: AggFunc,
    },
    /// Either a textual `condition` or a structured `predicate`.
    Filter {
        #[serde(default)]
        condition: Option<String>,
        #[serde(default)]
        predicate: Option<Predicate>,
    },
    Enrich {
        table: String,
        on: String,
    },
}

fn default_n_clusters() -> usize {
    DEFAULT_N_CLUSTERS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_z_threshold() -> f64 {
    DEFAULT_Z_THRESHOLD
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Dedupe => "dedupe",
            Stage::Impute { .. } => "impute",
            Stage::Normalize => "normalize",
            Stage::Standardize => "standardize",
            Stage::Encode => "encode",
            Stage::Outliers { .. } => "outliers",
            Stage::Uppercase => "uppercase",
            Stage::CheckMissing => "check_missing",
            Stage::Aggregate { .. } => "aggregate",
            Stage::Filter { .. } => "filter",
            Stage::Enrich { .. } => "enrich",
        }
    }

    fn invalid(&self, message: impl Into<String>) -> TransformError {
        TransformError::InvalidStage {
            stage: self.name().to_string(),
            message: message.into(),
        }
    }

    fn filter_predicate(&self) -> Result<Predicate> {
        match self {
            Stage::Filter {
                condition: Some(condition),
                predicate: None,
            } => condition.parse(),
            Stage::Filter {
                condition: None,
                predicate: Some(predicate),
            } => Ok(predicate.clone()),
            _ => Err(self.invalid("set exactly one of `condition` or `predicate`")),
        }
    }
}

/// Stages plus the side tables that enrich steps join against.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    tables: BTreeMap<String, TableState>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            tables: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, table: TableState) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order, each on the previous stage's output.
    pub fn run(&self, state: TableState) -> Result<TableState> {
        self.stages
            .iter()
            .enumerate()
            .try_fold(state, |state, (idx, stage)| {
                let span = info_span!("stage", step = idx + 1, stage = stage.name());
                let _guard = span.enter();
                self.apply(stage, state)
            })
    }

    /// Apply a single stage.
    pub fn apply(&self, stage: &Stage, state: TableState) -> Result<TableState> {
        let before = state.height();
        let result = match stage {
            Stage::Dedupe => deduplicate(state)?,
            Stage::Impute { n_clusters, seed } => {
                if *n_clusters == 0 {
                    return Err(stage.invalid("n_clusters must be at least 1"));
                }
                impute_by_clustering(
                    state,
                    ImputeOptions {
                        n_clusters: *n_clusters,
                        seed: *seed,
                    },
                )?
            }
            Stage::Normalize => normalize(state)?,
            Stage::Standardize => standardize(state)?,
            Stage::Encode => encode_categorical(state)?,
            Stage::Outliers { z_threshold } => {
                if !(z_threshold.is_finite() && *z_threshold > 0.0) {
                    return Err(stage.invalid("z_threshold must be a positive number"));
                }
                filter_outliers(state, *z_threshold)?
            }
            Stage::Uppercase => uppercase_text(state)?,
            Stage::CheckMissing => {
                let report = missing_report(&state);
                let data = report.to_frame()?;
                state.with_data(data)
            }
            Stage::Aggregate {
                group_by,
                column,
                func,
            } => aggregate(state, group_by, column, *func)?,
            Stage::Filter { .. } => filter(state, &stage.filter_predicate()?)?,
            Stage::Enrich { table, on } => {
                let other = self
                    .tables
                    .get(table)
                    .ok_or_else(|| TransformError::UnknownTable {
                        table: table.clone(),
                    })?;
                enrich(state, other, on)?
            }
        };
        info!(before, after = result.height(), columns = result.width(), "stage complete");
        Ok(result)
    }
}

/// A pipeline as declared on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// Side tables for enrich steps: table name to CSV path, relative to the
    /// pipeline file.
    #[serde(default)]
    pub tables: BTreeMap<String, PathBuf>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Stage>,
}

impl PipelineSpec {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|source| TransformError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a pipeline file. Side-table paths are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut spec = Self::from_toml_str(&contents, path)?;
        if let Some(dir) = path.parent() {
            for table_path in spec.tables.values_mut() {
                if table_path.is_relative() {
                    *table_path = dir.join(&*table_path);
                }
            }
        }
        Ok(spec)
    }

    /// Filter conditions are parsed eagerly so a bad file fails before any
    /// data is touched.
    pub fn check(&self) -> Result<()> {
        for step in &self.steps {
            if let Stage::Filter { .. } = step {
                step.filter_predicate()?;
            }
            if let Stage::Enrich { table, .. } = step
                && !self.tables.contains_key(table)
            {
                return Err(TransformError::UnknownTable {
                    table: table.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.steps.clone())
    }
}
