// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair stage against meshes read back from disk

use anyhow::Result;
use meshbool::geometry::mesh_utils::{is_closed, signed_volume};
use meshbool::geometry::{Mesh, Primitive};
use meshbool::{io, make_sphere, repair, Pipeline, RepairOptions};
use nalgebra::{Point3, Vector3};
use tempfile::TempDir;

/// Unit sphere with the triangles around its north pole removed
fn capped_sphere() -> Result<Mesh> {
    let mut sphere = make_sphere(Point3::origin(), 1.0)?;
    sphere.triangles.retain(|t| !t.indices.contains(&0));
    Ok(sphere)
}

#[test]
fn test_open_sphere_is_closed_after_file_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("open.ply");
    io::save(&capped_sphere()?, &path)?;

    let loaded = io::load(&path)?;
    assert!(!is_closed(&loaded));

    let (repaired, report) = repair(&loaded, &RepairOptions::default())?;
    assert_eq!(report.boundaries_before, 1);
    assert_eq!(report.holes_filled, 1);
    assert_eq!(report.boundaries, 0);
    assert!(is_closed(&repaired));
    assert!(signed_volume(&repaired) > 0.0);
    Ok(())
}

#[test]
fn test_hole_limit_leaves_large_holes_open() -> Result<()> {
    let options = RepairOptions {
        max_hole_edges: 4,
        ..RepairOptions::default()
    };
    let (repaired, report) = repair(&capped_sphere()?, &options)?;

    assert_eq!(report.holes_filled, 0);
    assert_eq!(report.boundaries, 1);
    assert!(!is_closed(&repaired));
    Ok(())
}

#[test]
fn test_closed_mesh_passes_through() -> Result<()> {
    let cube = Primitive::cube(Vector3::new(1.0, 2.0, 3.0), false).to_mesh()?;
    let options = RepairOptions {
        clean: true,
        ..RepairOptions::default()
    };
    let (repaired, report) = repair(&cube, &options)?;

    assert_eq!(report.boundaries, 0);
    assert_eq!(report.self_intersection_free, Some(true));
    assert_eq!(repaired.triangle_count(), 12);
    Ok(())
}

#[test]
fn test_pipeline_repairs_before_sizing_sphere() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("open.stl");
    io::save(&capped_sphere()?, &path)?;

    let output = Pipeline::builder(&path).build()?.execute()?;
    let report = output.repair_report.as_ref().expect("repair ran");
    assert_eq!(report.boundaries, 0);
    assert!(is_closed(&output.mesh));
    assert!(!output.result.is_empty());
    Ok(())
}
