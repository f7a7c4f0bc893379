// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and operations

mod bbox;
mod boolean;
mod csg;
mod mesh;
pub mod mesh_utils;
mod primitives;

pub use bbox::{bounds_of, BoundingBox};
pub use boolean::{combine, combine_named, combine_with, BooleanEngine, BooleanOp, BspEngine};
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::{
    make_sphere, Primitive, SphereSource, DEFAULT_PHI_RESOLUTION, DEFAULT_THETA_RESOLUTION,
};
