// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Conversion between [`Mesh`] and plain vertex/face arrays
//!
//! Face connectivity travels as a [`CellArray`]: a flat buffer where every
//! cell is written as its point count followed by that many point ids,
//! e.g. `[3, a, b, c, 3, d, e, f]`. Callers of [`to_arrays`] and
//! [`from_arrays`] only ever see `[usize; 3]` triangles.

use crate::error::Result;
use crate::geometry::Mesh;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Plain arrays describing a triangle mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshArrays {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
}

impl MeshArrays {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Interleaved cell connectivity (`count, id, id, ...`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellArray {
    data: Vec<i64>,
    cells: usize,
}

impl CellArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triangles(faces: &[[usize; 3]]) -> Self {
        let mut cells = Self {
            data: Vec::with_capacity(faces.len() * 4),
            cells: 0,
        };
        for face in faces {
            cells.push_cell(face);
        }
        cells
    }

    pub fn push_cell(&mut self, ids: &[usize]) {
        self.data.push(ids.len() as i64);
        self.data.extend(ids.iter().map(|&id| id as i64));
        self.cells += 1;
    }

    pub fn as_raw(&self) -> &[i64] {
        &self.data
    }

    pub fn cell_count(&self) -> usize {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    /// Point ids of each cell, in order
    pub fn cells(&self) -> impl Iterator<Item = &[i64]> + '_ {
        let mut offset = 0;
        std::iter::from_fn(move || {
            let count = *self.data.get(offset)? as usize;
            let ids = &self.data[offset + 1..offset + 1 + count];
            offset += 1 + count;
            Some(ids)
        })
    }

    /// Fan-triangulate every cell. Cells with fewer than three points are
    /// skipped; the second value is how many were skipped.
    pub fn triangulate(&self) -> (Vec<[usize; 3]>, usize) {
        let mut faces = Vec::with_capacity(self.cells);
        let mut skipped = 0;

        for ids in self.cells() {
            if ids.len() < 3 {
                skipped += 1;
                continue;
            }
            let first = ids[0] as usize;
            for pair in ids[1..].windows(2) {
                faces.push([first, pair[0] as usize, pair[1] as usize]);
            }
        }

        (faces, skipped)
    }
}

/// Export a mesh as vertex and triangle arrays
pub fn to_arrays(mesh: &Mesh) -> MeshArrays {
    let triangles: Vec<[usize; 3]> = mesh.triangles.iter().map(|t| t.indices).collect();
    let (faces, _) = CellArray::from_triangles(&triangles).triangulate();

    MeshArrays {
        vertices: mesh
            .vertices
            .iter()
            .map(|v| [v.position.x, v.position.y, v.position.z])
            .collect(),
        faces,
    }
}

/// Build a mesh from vertex and triangle arrays.
/// Fails with `InvalidMesh` when a face addresses a missing vertex.
pub fn from_arrays(arrays: &MeshArrays) -> Result<Mesh> {
    from_cells(&arrays.vertices, &CellArray::from_triangles(&arrays.faces))
}

/// Build a mesh from points and arbitrary polygon cells
pub fn from_cells(vertices: &[[f64; 3]], cells: &CellArray) -> Result<Mesh> {
    let (faces, _) = cells.triangulate();
    let positions = vertices
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    Mesh::from_parts(positions, faces)
}
