// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair stage - boundary filling and self-intersection cleanup

mod fill;
mod fixer;
mod intersect;

pub use fixer::MeshFixer;

use crate::error::{MeshBoolError, Result};
use crate::geometry::Mesh;
use crate::io::{from_arrays, to_arrays};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Which repair steps run and with what limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    pub fill_holes: bool,
    /// Largest hole, in boundary edges, that gets filled; 0 fills all
    pub max_hole_edges: usize,
    pub clean: bool,
    pub clean_max_iters: usize,
    pub clean_inner_loops: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            fill_holes: true,
            max_hole_edges: 0,
            clean: false,
            clean_max_iters: 10,
            clean_inner_loops: 3,
        }
    }
}

/// What the repair stage did
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub boundaries_before: usize,
    pub holes_filled: usize,
    /// Boundary loops left after all enabled steps
    pub boundaries: usize,
    /// `Some(true)` when cleaning ran and left no self-intersections
    pub self_intersection_free: Option<bool>,
    pub vertices: usize,
    pub triangles: usize,
}

/// Run the mesh fixer over `mesh` and rebuild a mesh from its output
#[instrument(skip_all, fields(vertices = mesh.vertex_count(), triangles = mesh.triangle_count()))]
pub fn repair(mesh: &Mesh, options: &RepairOptions) -> Result<(Mesh, RepairReport)> {
    let mut fixer = MeshFixer::load_arrays(&to_arrays(mesh))?;

    let boundaries_before = fixer.boundaries();
    let holes_filled = if options.fill_holes {
        fixer.fill_small_boundaries(options.max_hole_edges)
    } else {
        0
    };

    let mut boundaries = fixer.boundaries();
    info!("There are {} boundaries", boundaries);

    let self_intersection_free = if options.clean {
        let free = fixer.clean(options.clean_max_iters, options.clean_inner_loops);
        boundaries = fixer.boundaries();
        info!(free, boundaries, "cleaning finished");
        Some(free)
    } else {
        None
    };

    let repaired =
        from_arrays(&fixer.return_arrays()).map_err(|e| MeshBoolError::Repair(e.to_string()))?;

    let report = RepairReport {
        boundaries_before,
        holes_filled,
        boundaries,
        self_intersection_free,
        vertices: repaired.vertex_count(),
        triangles: repaired.triangle_count(),
    };
    Ok((repaired, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::make_sphere;
    use nalgebra::Point3;

    #[test]
    fn test_default_options_fill_only() {
        let options = RepairOptions::default();
        assert!(options.fill_holes);
        assert!(!options.clean);
        assert_eq!(options.max_hole_edges, 0);
    }

    #[test]
    fn test_options_deserialize_partial_table() {
        let options: RepairOptions = toml::from_str("clean = true\nmax_hole_edges = 12").unwrap();
        assert!(options.fill_holes);
        assert!(options.clean);
        assert_eq!(options.max_hole_edges, 12);
        assert_eq!(options.clean_max_iters, 10);
    }

    #[test]
    fn test_repair_closes_open_sphere() {
        let mut mesh = make_sphere(Point3::origin(), 1.0).unwrap();
        mesh.triangles.truncate(90);

        let (repaired, report) = repair(&mesh, &RepairOptions::default()).unwrap();
        assert!(report.boundaries_before >= 1);
        assert_eq!(report.holes_filled, report.boundaries_before);
        assert_eq!(report.boundaries, 0);
        assert_eq!(report.self_intersection_free, None);
        assert_eq!(report.triangles, repaired.triangle_count());
    }

    #[test]
    fn test_repair_without_fill_keeps_holes() {
        let mut mesh = make_sphere(Point3::origin(), 1.0).unwrap();
        mesh.triangles.remove(10);
        let options = RepairOptions {
            fill_holes: false,
            ..RepairOptions::default()
        };

        let (repaired, report) = repair(&mesh, &options).unwrap();
        assert_eq!(report.boundaries, 1);
        assert_eq!(repaired.triangle_count(), 95);
    }

    #[test]
    fn test_repair_rejects_empty_mesh() {
        assert!(matches!(
            repair(&Mesh::empty(), &RepairOptions::default()),
            Err(MeshBoolError::Repair(_))
        ));
    }
}
