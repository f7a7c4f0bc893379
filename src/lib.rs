// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshbool
//!
//! Loads an STL or PLY mesh, optionally repairs it, builds a sphere sized
//! from the mesh's bounding box and combines the two with a boolean
//! operation. The result can be saved, summarized as JSON and inspected in
//! an interactive viewer.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod repair;
pub mod viewer;

pub use config::Config;
pub use error::{MeshBoolError, Result};
pub use geometry::{
    bounds_of, combine, combine_named, combine_with, make_sphere, BooleanEngine, BooleanOp,
    BspEngine, Mesh,
};
pub use io::{from_arrays, load, save, to_arrays, MeshArrays, MeshFormat};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineOutput, RunSummary, SPHERE_SCALE};
pub use repair::{repair, MeshFixer, RepairOptions, RepairReport};
pub use viewer::{show, Scene, ViewerOptions};

/// Load `path` and combine it with a default-sized sphere, without repair
pub fn carve_file(path: impl AsRef<std::path::Path>, op: BooleanOp) -> Result<Mesh> {
    let mesh = load(path)?;
    let (center, diagonal) = bounds_of(&mesh)?;
    let sphere = make_sphere(center, SPHERE_SCALE * diagonal)?;
    combine(&mesh, &sphere, op)
}
