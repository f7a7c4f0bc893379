// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Array-based mesh fixer: boundary loops, hole filling and cleaning

use super::{fill, intersect};
use crate::error::{MeshBoolError, Result};
use crate::geometry::mesh_utils::Edge;
use crate::io::MeshArrays;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;
use tracing::debug;

/// Holds a triangle soup and repairs it in place
#[derive(Debug, Clone)]
pub struct MeshFixer {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl MeshFixer {
    /// Take ownership of copies of the arrays; rejects empty input and
    /// faces addressing missing vertices.
    pub fn load_arrays(arrays: &MeshArrays) -> Result<Self> {
        if arrays.vertices.is_empty() || arrays.faces.is_empty() {
            return Err(MeshBoolError::Repair(
                "mesh fixer needs at least one face".to_string(),
            ));
        }

        let count = arrays.vertices.len();
        if let Some(face) = arrays.faces.iter().find(|f| f.iter().any(|&i| i >= count)) {
            return Err(MeshBoolError::Repair(format!(
                "face {:?} references a vertex outside 0..{}",
                face, count
            )));
        }

        Ok(Self {
            vertices: arrays
                .vertices
                .iter()
                .map(|&[x, y, z]| Point3::new(x, y, z))
                .collect(),
            faces: arrays.faces.clone(),
        })
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of boundary loops
    pub fn boundaries(&self) -> usize {
        self.boundary_loops().len()
    }

    /// Closed boundary loops, each following the direction of the faces
    /// that own its edges
    pub fn boundary_loops(&self) -> Vec<Vec<usize>> {
        let mut edge_counts: AHashMap<Edge, u32> = AHashMap::with_capacity(self.faces.len() * 2);
        for &[a, b, c] in &self.faces {
            for edge in [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)] {
                *edge_counts.entry(edge).or_insert(0) += 1;
            }
        }

        let mut next: AHashMap<usize, Vec<usize>> = AHashMap::new();
        for &[a, b, c] in &self.faces {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                if edge_counts.get(&Edge::new(from, to)) == Some(&1) {
                    next.entry(from).or_default().push(to);
                }
            }
        }

        let mut starts: Vec<usize> = next.keys().copied().collect();
        starts.sort_unstable();

        let mut loops = Vec::new();
        for start in starts {
            while let Some(first) = next.get_mut(&start).and_then(Vec::pop) {
                let mut boundary = vec![start];
                let mut current = first;
                let closed = loop {
                    if current == start {
                        break true;
                    }
                    boundary.push(current);
                    match next.get_mut(&current).and_then(Vec::pop) {
                        Some(following) => current = following,
                        None => break false,
                    }
                };

                if closed && boundary.len() >= 3 {
                    loops.push(boundary);
                } else {
                    debug!(vertices = boundary.len(), "skipping open boundary chain");
                }
            }
        }

        loops
    }

    /// Fill every boundary loop with at most `max_edges` edges
    /// (`0` fills all). Returns the number of holes filled.
    pub fn fill_small_boundaries(&mut self, max_edges: usize) -> usize {
        let mut filled = 0;
        for boundary in self.boundary_loops() {
            if max_edges != 0 && boundary.len() > max_edges {
                continue;
            }
            // New faces run against the existing boundary edges
            let polygon: Vec<usize> = boundary.into_iter().rev().collect();
            self.faces.extend(fill::ear_clip(&self.vertices, &polygon));
            filled += 1;
        }
        debug!(filled, max_edges, "filled boundaries");
        filled
    }

    /// Drop faces with repeated indices or zero area, and faces using the
    /// same three vertices as an earlier face. Returns how many were dropped.
    pub fn remove_degenerate_faces(&mut self) -> usize {
        let before = self.faces.len();
        let vertices = &self.vertices;
        let mut seen: AHashSet<[usize; 3]> = AHashSet::with_capacity(before);

        self.faces.retain(|&[a, b, c]| {
            if a == b || b == c || a == c {
                return false;
            }
            let doubled_area = (vertices[b] - vertices[a]).cross(&(vertices[c] - vertices[a]));
            if doubled_area.norm_squared() == 0.0 {
                return false;
            }
            let mut key = [a, b, c];
            key.sort_unstable();
            seen.insert(key)
        });

        before - self.faces.len()
    }

    /// Face pairs that cross each other
    pub fn self_intersections(&self) -> Vec<(usize, usize)> {
        intersect::self_intersections(&self.vertices, &self.faces)
    }

    /// Remove degenerate faces and self-intersections, re-filling the holes
    /// they leave. Each of the `max_iters` rounds runs up to `inner_loops`
    /// fill passes. Returns `true` when no self-intersections remain.
    pub fn clean(&mut self, max_iters: usize, inner_loops: usize) -> bool {
        for iteration in 0..max_iters {
            let degenerate = self.remove_degenerate_faces();
            let pairs = self.self_intersections();
            debug!(
                iteration,
                degenerate,
                intersecting_pairs = pairs.len(),
                "clean pass"
            );
            if pairs.is_empty() {
                return true;
            }

            let doomed: AHashSet<usize> = pairs.iter().flat_map(|&(i, j)| [i, j]).collect();
            let mut index = 0;
            self.faces.retain(|_| {
                let keep = !doomed.contains(&index);
                index += 1;
                keep
            });

            for _ in 0..inner_loops.max(1) {
                if self.fill_small_boundaries(0) == 0 {
                    break;
                }
            }
        }

        self.remove_degenerate_faces();
        self.self_intersections().is_empty()
    }

    /// Current mesh with unreferenced vertices compacted away
    pub fn return_arrays(&self) -> MeshArrays {
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut vertices = Vec::new();

        let faces = self
            .faces
            .iter()
            .map(|face| {
                face.map(|old| {
                    *remap[old].get_or_insert_with(|| {
                        let p = self.vertices[old];
                        vertices.push([p.x, p.y, p.z]);
                        vertices.len() - 1
                    })
                })
            })
            .collect();

        MeshArrays { vertices, faces }
    }
}
