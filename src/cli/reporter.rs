// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::mesh_utils::validate_mesh;
use crate::geometry::BooleanOp;
use crate::pipeline::PipelineOutput;
use crate::repair::RepairReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Number of stage messages a full run can emit
const PIPELINE_STAGES: u64 = 6;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report what a finished run produced
    pub fn report_run(input: &Path, op: BooleanOp, output: &PipelineOutput, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Input:".bold(), input.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());

        println!("\n{}", "Mesh:".bold());
        Self::print_counts(output.mesh.vertex_count(), output.mesh.triangle_count());
        println!(
            "  {} ({:.4}, {:.4}, {:.4})",
            "Center:".bright_black(),
            output.center.x,
            output.center.y,
            output.center.z
        );
        println!("  {} {:.4}", "Diagonal:".bright_black(), output.diagonal);

        println!("\n{}", "Sphere:".bold());
        println!("  {} {:.4}", "Radius:".bright_black(), output.sphere.radius);
        Self::print_counts(
            output.sphere_mesh.vertex_count(),
            output.sphere_mesh.triangle_count(),
        );

        println!("\n{} {}", "Result:".bold(), op.to_string().cyan());
        Self::print_counts(output.result.vertex_count(), output.result.triangle_count());
        if output.result.is_empty() {
            println!("  {}", "Result mesh is empty".yellow());
        } else {
            let health = validate_mesh(&output.result);
            if !health.is_closed {
                println!(
                    "  {} {} of {} edges",
                    "Open edges:".bright_black(),
                    health.boundary_edge_count.to_string().yellow(),
                    health.edge_count
                );
            }
        }

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Boundary diagnostic plus what the fixer did; printed as soon as the
    /// repair stage finishes
    pub fn report_repair(report: &RepairReport) {
        println!("{}", Self::boundary_line(report.boundaries));
        if report.holes_filled > 0 {
            println!(
                "  {} {} of {}",
                "Holes filled:".bright_black(),
                report.holes_filled.to_string().cyan(),
                report.boundaries_before
            );
        }
        match report.self_intersection_free {
            Some(true) => println!("  {}", "No self-intersections remain".green()),
            Some(false) => println!("  {}", "Self-intersections remain after cleaning".yellow()),
            None => {}
        }
    }

    pub fn boundary_line(boundaries: usize) -> String {
        format!("There are {} boundaries", boundaries)
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Stage spinner, only in verbose mode
    pub fn spinner(verbose: bool) -> Option<ProgressBar> {
        if !verbose {
            return None;
        }
        let bar = ProgressBar::new(PIPELINE_STAGES);
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    }

    fn print_counts(vertices: usize, triangles: usize) {
        println!(
            "  {} {}",
            "Vertices:".bright_black(),
            vertices.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Triangles:".bright_black(),
            triangles.to_string().cyan()
        );
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
