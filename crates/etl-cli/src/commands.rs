use anyhow::{Context, Result};
use comfy_table::Table;
use etl_cli::pipeline::{
    build_registry, read_records, requested_entities, run_transform, split_and_load, write_csv,
};
use etl_cli::types::{LoadResult, TransformResult};
use etl_load::SqliteSink;
use etl_transform::PipelineSpec;
use tracing::{info, info_span};

use crate::cli::{EntitiesArgs, LoadArgs, TransformArgs};
use crate::summary::{apply_table_style, print_preview};

pub fn run_entities(args: &EntitiesArgs) -> Result<()> {
    let registry = build_registry(args.schemas.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Entity", "Fields", "Declared columns"]);
    apply_table_style(&mut table);
    for schema in registry.schemas() {
        table.add_row(vec![
            schema.name().to_string(),
            schema.fields().len().to_string(),
            schema.columns().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_load(args: &LoadArgs) -> Result<LoadResult> {
    let span = info_span!("load", input = %args.input.display());
    let _guard = span.enter();

    let registry = build_registry(args.schemas.as_deref())?;
    let records = read_records(&args.input)?;
    let entities = requested_entities(&args.entities);
    info!(rows = records.len(), entities = entities.len(), "splitting records");

    let (summaries, database) = if args.dry_run {
        (split_and_load(&records, &registry, &entities, None), None)
    } else {
        let path = args
            .db
            .clone()
            .unwrap_or_else(|| args.input.with_extension("db"));
        let mut sink = SqliteSink::open(&path)
            .with_context(|| format!("open database {}", path.display()))?;
        let summaries = split_and_load(&records, &registry, &entities, Some(&mut sink));
        (summaries, Some(path))
    };

    let has_errors = summaries.iter().any(|summary| summary.status.is_error());
    Ok(LoadResult {
        input: args.input.clone(),
        database,
        source_rows: records.len(),
        entities: summaries,
        has_errors,
    })
}

pub fn run_transform_command(args: &TransformArgs) -> Result<TransformResult> {
    let spec = PipelineSpec::load(&args.pipeline)
        .with_context(|| format!("load pipeline {}", args.pipeline.display()))?;
    let name = spec.name.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map_or_else(|| "records".to_string(), |stem| stem.to_string_lossy().into_owned())
    });
    let records = read_records(&args.input)?;
    let state = run_transform(&records, &spec, &name)?;

    match &args.output {
        Some(path) => write_csv(&state.data, path)?,
        None => print_preview(&state, args.preview_rows)?,
    }
    Ok(TransformResult {
        pipeline: name,
        stages: spec.steps.iter().map(|stage| stage.name()).collect(),
        input_rows: records.len(),
        output: args.output.clone(),
    })
}
