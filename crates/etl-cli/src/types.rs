use std::path::PathBuf;

use etl_model::CoercionFailure;

/// Outcome of `etl load` over one input file.
#[derive(Debug)]
pub struct LoadResult {
    pub input: PathBuf,
    /// Database written to; `None` on a dry run.
    pub database: Option<PathBuf>,
    pub source_rows: usize,
    pub entities: Vec<EntitySummary>,
    pub has_errors: bool,
}

impl LoadResult {
    pub fn total_records(&self) -> usize {
        self.entities.iter().map(|summary| summary.records).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.entities.iter().map(|summary| summary.failures.len()).sum()
    }
}

#[derive(Debug)]
pub struct EntitySummary {
    pub entity: String,
    pub records: usize,
    pub failures: Vec<CoercionFailure>,
    pub warnings: usize,
    pub status: LoadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Rows written to the sink.
    Loaded(usize),
    /// Dry run; nothing written.
    Validated,
    /// The sink rejected the entity.
    Failed(String),
    /// The entity is not registered.
    Unknown(String),
}

impl LoadStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, LoadStatus::Failed(_) | LoadStatus::Unknown(_))
    }
}

/// Outcome of `etl transform`.
#[derive(Debug)]
pub struct TransformResult {
    pub pipeline: String,
    pub stages: Vec<&'static str>,
    pub input_rows: usize,
    pub output: Option<PathBuf>,
}
