//! Table transforms for the ETL pipeline.
//!
//! This crate provides the stages applied to a [`TableState`]:
//!
//! - **stages**: deduplication, clustering imputation, normalization,
//!   standardization, one-hot encoding, outlier filtering, uppercasing and the
//!   missing-value report
//! - **relational**: aggregation, predicate filtering and left-join enrichment
//! - **pipeline**: stage lists declared in TOML and run as a fold
//! - **cluster**: seeded k-means used by the imputation stage

pub mod cluster;
pub mod error;
pub mod pipeline;
pub mod relational;
pub mod stages;
pub mod state;
mod stats;

pub use cluster::KMeans;
pub use error::{Result, TransformError};
pub use pipeline::{Pipeline, PipelineSpec, Stage};
pub use relational::{AggFunc, CompareOp, Predicate, aggregate, enrich, filter};
pub use stages::{
    DEFAULT_N_CLUSTERS, DEFAULT_SEED, DEFAULT_Z_THRESHOLD, ImputeOptions, MissingReport,
    deduplicate, encode_categorical, filter_outliers, impute_by_clustering, missing_report,
    normalize, standardize, uppercase_text,
};
pub use state::TableState;
