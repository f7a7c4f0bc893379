// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshbool CLI

use anyhow::{Context, Result};
use clap::Parser;
use meshbool::cli::Reporter;
use meshbool::{BooleanOp, Config, PipelineBuilder};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshbool")]
#[command(version)]
#[command(about = "Combine an STL/PLY mesh with a sphere sized from its bounding box", long_about = None)]
struct Cli {
    /// Input mesh (.stl or .ply)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Boolean operation: union, intersection or difference
    #[arg(short = 'o', long)]
    operation: Option<String>,

    /// Skip the repair stage
    #[arg(long)]
    no_repair: bool,

    /// Also remove self-intersections during repair
    #[arg(long)]
    clean: bool,

    /// Only fill holes with at most N boundary edges (0 fills all)
    #[arg(long, value_name = "N")]
    max_hole_edges: Option<usize>,

    /// Sphere radius as a fraction of the bounding box diagonal
    #[arg(long, value_name = "F")]
    scale: Option<f64>,

    /// Write the result mesh (.stl or .ply)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a JSON run summary
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Do not open the viewer
    #[arg(long)]
    no_view: bool,

    /// Config file (defaults to ./meshbool.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "meshbool=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let mut builder =
        PipelineBuilder::from_config(&cli.input, &config).on_repair(Reporter::report_repair);
    if let Some(bar) = Reporter::spinner(cli.verbose) {
        builder = builder.progress(bar);
    }
    let pipeline = builder.build()?;

    let start = Instant::now();
    let output = pipeline
        .execute()
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;
    Reporter::report_run(&cli.input, pipeline.operation(), &output, start.elapsed());

    if let Some(path) = &config.output {
        Reporter::success(&format!("Result written to {}", path.display()));
    }
    if let Some(path) = &config.summary {
        Reporter::report_info(&format!("Summary written to {}", path.display()));
    }
    if output.result.is_empty() {
        Reporter::report_warning("The boolean operation produced an empty mesh");
    }

    pipeline.show(&output)?;
    Ok(())
}

/// File or defaults, then `MESHBOOL_*` variables, then flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };

    if let Some(operation) = &cli.operation {
        config.operation = operation.parse::<BooleanOp>()?;
    }
    if cli.no_repair {
        config.repair.enabled = false;
    }
    if cli.clean {
        config.repair.options.clean = true;
    }
    if let Some(max_edges) = cli.max_hole_edges {
        config.repair.options.max_hole_edges = max_edges;
    }
    if let Some(scale) = cli.scale {
        config.sphere.scale = scale;
    }
    if cli.output.is_some() {
        config.output = cli.output.clone();
    }
    if cli.summary.is_some() {
        config.summary = cli.summary.clone();
    }
    if cli.no_view {
        config.viewer.enabled = false;
    }

    config.validate()?;
    Ok(config)
}
