// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh files and array conversion

mod arrays;
mod exporter;
mod format;
mod importer;

pub use arrays::{from_arrays, from_cells, to_arrays, CellArray, MeshArrays};
pub use exporter::{save, write_ply, write_stl};
pub use format::MeshFormat;
pub use importer::{load, read_ply, read_stl};
