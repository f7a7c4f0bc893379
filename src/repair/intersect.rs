// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Self-intersection detection between faces of one mesh

use nalgebra::Point3;
use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::math::{Isometry, Point};
use parry3d::query;
use parry3d::shape::Triangle;
use rayon::prelude::*;

fn to_parry(p: &Point3<f64>) -> Point<f32> {
    Point::new(p.x as f32, p.y as f32, p.z as f32)
}

fn shares_vertex(a: &[usize; 3], b: &[usize; 3]) -> bool {
    a.iter().any(|i| b.contains(i))
}

/// Pairs of faces `(i, j)`, `i < j`, that intersect without sharing a vertex.
///
/// Broad phase sweeps face AABBs along x; the exact triangle tests run in
/// parallel.
pub fn self_intersections(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Vec<(usize, usize)> {
    let triangles: Vec<Triangle> = faces
        .iter()
        .map(|&[a, b, c]| {
            Triangle::new(
                to_parry(&vertices[a]),
                to_parry(&vertices[b]),
                to_parry(&vertices[c]),
            )
        })
        .collect();
    let boxes: Vec<Aabb> = triangles.iter().map(Triangle::local_aabb).collect();

    let mut order: Vec<usize> = (0..faces.len()).collect();
    order.sort_by(|&i, &j| boxes[i].mins.x.total_cmp(&boxes[j].mins.x));

    let mut candidates = Vec::new();
    for (position, &i) in order.iter().enumerate() {
        for &j in &order[position + 1..] {
            if boxes[j].mins.x > boxes[i].maxs.x {
                break;
            }
            if boxes[i].intersects(&boxes[j]) && !shares_vertex(&faces[i], &faces[j]) {
                candidates.push((i.min(j), i.max(j)));
            }
        }
    }

    let identity = Isometry::identity();
    let mut pairs: Vec<(usize, usize)> = candidates
        .into_par_iter()
        .filter(|&(i, j)| {
            query::intersection_test(&identity, &triangles[i], &identity, &triangles[j])
                .unwrap_or(false)
        })
        .collect();
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Primitive, SphereSource};
    use nalgebra::Vector3;

    fn arrays(mesh: &Mesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        (
            mesh.vertices.iter().map(|v| v.position).collect(),
            mesh.triangles.iter().map(|t| t.indices).collect(),
        )
    }

    fn cube_at(offset: f64) -> Mesh {
        let mut cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true)
            .to_mesh()
            .unwrap();
        for vertex in &mut cube.vertices {
            vertex.position.x += offset;
        }
        cube
    }

    #[test]
    fn test_closed_sphere_has_no_self_intersections() {
        let sphere = SphereSource::new(Point3::origin(), 1.0).to_mesh().unwrap();
        let (vertices, faces) = arrays(&sphere);
        assert!(self_intersections(&vertices, &faces).is_empty());
    }

    #[test]
    fn test_overlapping_cubes_intersect() {
        let mut mesh = cube_at(0.0);
        mesh.merge(&cube_at(1.0));
        let (vertices, faces) = arrays(&mesh);

        let pairs = self_intersections(&vertices, &faces);
        assert!(!pairs.is_empty());
        // Every pair mixes one face from each cube
        assert!(pairs.iter().all(|&(i, j)| i < 12 && j >= 12));
    }

    #[test]
    fn test_separated_cubes_do_not_intersect() {
        let mut mesh = cube_at(0.0);
        mesh.merge(&cube_at(5.0));
        let (vertices, faces) = arrays(&mesh);
        assert!(self_intersections(&vertices, &faces).is_empty());
    }
}
