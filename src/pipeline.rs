// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Load, repair, cut with a bbox-sized sphere, then save and show

use crate::config::Config;
use crate::error::{MeshBoolError, Result};
use crate::geometry::{
    bounds_of, combine_with, BooleanEngine, BooleanOp, BspEngine, Mesh, SphereSource,
    DEFAULT_PHI_RESOLUTION, DEFAULT_THETA_RESOLUTION,
};
use crate::io;
use crate::repair::{repair, RepairOptions, RepairReport};
use crate::viewer::{self, ViewerOptions};
use egui::Color32;
use indicatif::ProgressBar;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Sphere radius as a fraction of the input's bounding box diagonal
pub const SPHERE_SCALE: f64 = 0.23;

/// Called with the repair report as soon as the repair stage finishes
#[derive(Clone)]
pub struct RepairHook(Arc<dyn Fn(&RepairReport) + Send + Sync>);

impl fmt::Debug for RepairHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RepairHook")
    }
}

/// Builder for [`Pipeline`]
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    input: PathBuf,
    operation: BooleanOp,
    repair: Option<RepairOptions>,
    sphere_scale: f64,
    theta_resolution: u32,
    phi_resolution: u32,
    output: Option<PathBuf>,
    summary: Option<PathBuf>,
    viewer: Option<ViewerOptions>,
    colors: Vec<Color32>,
    progress: Option<ProgressBar>,
    on_repair: Option<RepairHook>,
}

impl PipelineBuilder {
    /// Defaults: repair with hole filling, difference, scale 0.23, no viewer
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            operation: BooleanOp::Difference,
            repair: Some(RepairOptions::default()),
            sphere_scale: SPHERE_SCALE,
            theta_resolution: DEFAULT_THETA_RESOLUTION,
            phi_resolution: DEFAULT_PHI_RESOLUTION,
            output: None,
            summary: None,
            viewer: None,
            colors: Vec::new(),
            progress: None,
            on_repair: None,
        }
    }

    /// Seed every setting from a loaded [`Config`]
    pub fn from_config(input: impl Into<PathBuf>, config: &Config) -> Self {
        let viewer = config.viewer.enabled.then(|| ViewerOptions::from(&config.viewer));
        Self {
            operation: config.operation,
            repair: config.repair.enabled.then(|| config.repair.options.clone()),
            sphere_scale: config.sphere.scale,
            theta_resolution: config.sphere.theta_resolution,
            phi_resolution: config.sphere.phi_resolution,
            output: config.output.clone(),
            summary: config.summary.clone(),
            viewer,
            colors: config
                .viewer
                .colors
                .iter()
                .map(|&[r, g, b]| Color32::from_rgb(r, g, b))
                .collect(),
            ..Self::new(input)
        }
    }

    pub fn operation(mut self, operation: BooleanOp) -> Self {
        self.operation = operation;
        self
    }

    pub fn repair(mut self, options: RepairOptions) -> Self {
        self.repair = Some(options);
        self
    }

    pub fn without_repair(mut self) -> Self {
        self.repair = None;
        self
    }

    pub fn sphere_scale(mut self, scale: f64) -> Self {
        self.sphere_scale = scale;
        self
    }

    pub fn sphere_resolution(mut self, theta: u32, phi: u32) -> Self {
        self.theta_resolution = theta;
        self.phi_resolution = phi;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn summary(mut self, path: impl Into<PathBuf>) -> Self {
        self.summary = Some(path.into());
        self
    }

    pub fn viewer(mut self, options: ViewerOptions) -> Self {
        self.viewer = Some(options);
        self
    }

    /// One colour per displayed mesh; missing entries render white
    pub fn colors(mut self, colors: Vec<Color32>) -> Self {
        self.colors = colors;
        self
    }

    pub fn without_viewer(mut self) -> Self {
        self.viewer = None;
        self
    }

    /// Stage messages go to this bar
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Run `hook` on the repair report before the sphere is built, so the
    /// diagnostic survives a failing boolean
    pub fn on_repair<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RepairReport) + Send + Sync + 'static,
    {
        self.on_repair = Some(RepairHook(Arc::new(hook)));
        self
    }

    /// Check paths and sizing before any work happens
    pub fn build(self) -> Result<Pipeline> {
        io::MeshFormat::from_path(&self.input)?;
        if let Some(output) = &self.output {
            io::MeshFormat::from_path(output)?;
        }
        if !(self.sphere_scale.is_finite() && self.sphere_scale > 0.0) {
            return Err(MeshBoolError::Config(format!(
                "sphere scale must be positive, got {}",
                self.sphere_scale
            )));
        }

        Ok(Pipeline { settings: self })
    }
}

/// Configured mesh boolean run
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: PipelineBuilder,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Input mesh after the optional repair
    pub mesh: Mesh,
    pub repair_report: Option<RepairReport>,
    pub center: Point3<f64>,
    pub diagonal: f64,
    pub sphere: SphereSource,
    pub sphere_mesh: Mesh,
    pub result: Mesh,
}

/// JSON-serializable account of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub operation: BooleanOp,
    pub input_vertices: usize,
    pub input_triangles: usize,
    /// `[xmin, xmax, ymin, ymax, zmin, zmax]` of the (repaired) input
    pub bounds: [f64; 6],
    pub center: [f64; 3],
    pub diagonal: f64,
    pub sphere_radius: f64,
    pub result_vertices: usize,
    pub result_triangles: usize,
    pub repair: Option<RepairReport>,
    pub output: Option<PathBuf>,
    pub elapsed_ms: u64,
}

impl Pipeline {
    pub fn builder(input: impl Into<PathBuf>) -> PipelineBuilder {
        PipelineBuilder::new(input)
    }

    pub fn input(&self) -> &Path {
        &self.settings.input
    }

    pub fn operation(&self) -> BooleanOp {
        self.settings.operation
    }

    /// Execute with the default BSP engine, then show the result
    pub fn run(&self) -> Result<PipelineOutput> {
        let output = self.execute()?;
        self.show(&output)?;
        Ok(output)
    }

    pub fn execute(&self) -> Result<PipelineOutput> {
        self.execute_with(&BspEngine)
    }

    /// Load, process, then save and summarize as configured
    #[instrument(skip_all, fields(input = %self.settings.input.display(), op = %self.settings.operation))]
    pub fn execute_with(&self, engine: &dyn BooleanEngine) -> Result<PipelineOutput> {
        let started = Instant::now();

        self.stage("Loading mesh");
        let mesh = io::load(&self.settings.input)?;

        let output = self.process(mesh, engine)?;

        if let Some(path) = &self.settings.output {
            self.stage("Saving result");
            io::save(&output.result, path)?;
        }

        if let Some(path) = &self.settings.summary {
            self.stage("Writing summary");
            let summary = self.summarize(&output, started.elapsed().as_millis() as u64);
            write_summary(&summary, path)?;
        }

        if let Some(bar) = &self.settings.progress {
            bar.finish_and_clear();
        }

        Ok(output)
    }

    /// Open the viewer on the result; does nothing when viewing is off
    pub fn show(&self, output: &PipelineOutput) -> Result<()> {
        match &self.settings.viewer {
            Some(options) => {
                info!("opening viewer");
                viewer::show(vec![output.result.clone()], &self.settings.colors, options)
            }
            None => Ok(()),
        }
    }

    /// In-memory part of the run: repair, size the sphere, combine
    pub fn process(&self, mesh: Mesh, engine: &dyn BooleanEngine) -> Result<PipelineOutput> {
        let (mesh, repair_report) = match &self.settings.repair {
            Some(options) => {
                self.stage("Repairing mesh");
                let (repaired, report) = repair(&mesh, options)?;
                if let Some(RepairHook(hook)) = &self.settings.on_repair {
                    match &self.settings.progress {
                        Some(bar) => bar.suspend(|| hook(&report)),
                        None => hook(&report),
                    }
                }
                (repaired, Some(report))
            }
            None => (mesh, None),
        };

        self.stage("Building sphere");
        let (center, diagonal) = bounds_of(&mesh)?;
        let sphere = SphereSource::new(center, self.settings.sphere_scale * diagonal)
            .with_resolution(self.settings.theta_resolution, self.settings.phi_resolution);
        let sphere_mesh = sphere.to_mesh()?;
        info!(
            center = ?center,
            radius = sphere.radius,
            "sphere sized from bounding box"
        );

        self.stage("Combining");
        let result = combine_with(engine, &mesh, &sphere_mesh, self.settings.operation)?;

        Ok(PipelineOutput {
            mesh,
            repair_report,
            center,
            diagonal,
            sphere,
            sphere_mesh,
            result,
        })
    }

    pub fn summarize(&self, output: &PipelineOutput, elapsed_ms: u64) -> RunSummary {
        RunSummary {
            input: self.settings.input.clone(),
            operation: self.settings.operation,
            input_vertices: output.mesh.vertex_count(),
            input_triangles: output.mesh.triangle_count(),
            bounds: output.mesh.bounding_box().to_array(),
            center: [output.center.x, output.center.y, output.center.z],
            diagonal: output.diagonal,
            sphere_radius: output.sphere.radius,
            result_vertices: output.result.vertex_count(),
            result_triangles: output.result.triangle_count(),
            repair: output.repair_report.clone(),
            output: self.settings.output.clone(),
            elapsed_ms,
        }
    }

    fn stage(&self, message: &'static str) {
        info!(stage = message);
        if let Some(bar) = &self.settings.progress {
            bar.set_message(message);
            bar.inc(1);
        }
    }
}

/// Write a run summary as pretty JSON
pub fn write_summary(summary: &RunSummary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| MeshBoolError::Config(format!("Failed to serialize summary: {}", e)))?;
    std::fs::write(path, json).map_err(|e| MeshBoolError::io(path, e))
}

impl From<&crate::config::ViewerConfig> for ViewerOptions {
    fn from(config: &crate::config::ViewerConfig) -> Self {
        let [r, g, b] = config.background;
        Self {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            background: Color32::from_rgb(r, g, b),
        }
    }
}
