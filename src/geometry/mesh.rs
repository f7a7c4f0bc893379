// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{MeshBoolError, Result};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Vertex with a placeholder normal, to be replaced by `recompute_normals`
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::z())
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from raw positions and index triples, validating bounds
    /// and deriving vertex normals.
    pub fn from_parts(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let mut mesh = Self {
            vertices: positions.into_iter().map(Vertex::at).collect(),
            triangles: faces.into_iter().map(Triangle::new).collect(),
        };
        mesh.validate()?;
        mesh.recompute_normals();
        Ok(mesh)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Positions of a triangle's corners
    pub fn corners(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i].position)
    }

    /// Check that every face index addresses an existing vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (face, triangle) in self.triangles.iter().enumerate() {
            if let Some(&bad) = triangle.indices.iter().find(|&&i| i >= count) {
                return Err(MeshBoolError::InvalidMesh(format!(
                    "face {} references vertex {} but mesh has {} vertices",
                    face, bad, count
                )));
            }
        }
        Ok(())
    }

    /// Merge with another mesh (simple union without CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Weld vertices lying within `epsilon` of an earlier kept vertex.
    /// Positions are bucketed into `epsilon` cells and each lookup scans the
    /// 27 surrounding cells, so pairs straddling a cell border still merge.
    /// Triangles collapsing to a degenerate shape are dropped.
    /// Returns the number of vertices removed
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let inv = 1.0 / epsilon;
        let cell = |p: &Point3<f64>| {
            (
                (p.x * inv).floor() as i64,
                (p.y * inv).floor() as i64,
                (p.z * inv).floor() as i64,
            )
        };

        let mut cells: AHashMap<(i64, i64, i64), Vec<usize>> =
            AHashMap::with_capacity(original_count);
        let mut new_vertices: Vec<Vertex> = Vec::with_capacity(original_count);
        let mut new_indices: Vec<usize> = Vec::with_capacity(original_count);

        for vertex in &self.vertices {
            let (cx, cy, cz) = cell(&vertex.position);
            let neighbours = (-1..=1).flat_map(|dx| {
                (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (cx + dx, cy + dy, cz + dz)))
            });
            let found = neighbours
                .filter_map(|key| cells.get(&key))
                .flatten()
                .copied()
                .find(|&kept| (new_vertices[kept].position - vertex.position).norm() <= epsilon);

            let index = match found {
                Some(kept) => kept,
                None => {
                    new_vertices.push(*vertex);
                    let kept = new_vertices.len() - 1;
                    cells.entry((cx, cy, cz)).or_default().push(kept);
                    kept
                }
            };
            new_indices.push(index);
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| new_indices[i]);
        }
        self.triangles.retain(|t| !t.is_degenerate());
        self.vertices = new_vertices;

        original_count - self.vertices.len()
    }

    /// Remove degenerate triangles and exact duplicates (same indices, any rotation).
    /// Returns the number of triangles removed
    pub fn remove_duplicate_triangles(&mut self) -> usize {
        use std::collections::HashSet;

        let original_count = self.triangles.len();
        let mut seen: HashSet<[usize; 3]> = HashSet::with_capacity(original_count);

        self.triangles.retain(|triangle| {
            if triangle.is_degenerate() {
                return false;
            }
            // Rotate so the smallest index leads; keeps winding intact
            let [a, b, c] = triangle.indices;
            let key = if a <= b && a <= c {
                [a, b, c]
            } else if b <= a && b <= c {
                [b, c, a]
            } else {
                [c, a, b]
            };
            seen.insert(key)
        });

        original_count - self.triangles.len()
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        if self.triangles.is_empty() {
            let removed = self.vertices.len();
            self.vertices.clear();
            return removed;
        }

        let mut used_vertices = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &i in &triangle.indices {
                used_vertices[i] = true;
            }
        }

        // old_index -> new_index
        let mut new_indices = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::new();

        for (old_idx, &used) in used_vertices.iter().enumerate() {
            if used {
                new_indices[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| new_indices[i]);
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// Recompute vertex normals from triangle geometry
    /// Face normals are area weighted and averaged at shared vertices
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [p0, p1, p2] = self.corners(triangle);
            // Cross product length is twice the area, so this is already area weighted
            let face_normal = (p1 - p0).cross(&(p2 - p0));
            for &idx in &triangle.indices {
                normal_sums[idx] += face_normal;
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(0.0).unwrap_or_else(Vector3::z);
        }
    }
}
