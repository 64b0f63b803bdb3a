//! CLI library components for the `etl` tool.

pub mod logging;
pub mod pipeline;
pub mod types;
