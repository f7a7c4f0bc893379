// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ear clipping of a 3D boundary loop projected onto its Newell plane

use earcutr::earcut;
use nalgebra::{Point3, Vector2, Vector3};

const EAR_EPSILON: f64 = 1e-12;

/// Newell normal of a closed polygon; its length is twice the polygon area
pub fn newell_normal(points: &[Point3<f64>], polygon: &[usize]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, &current) in polygon.iter().enumerate() {
        let a = points[current];
        let b = points[polygon[(i + 1) % polygon.len()]];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Triangulate `polygon` (indices into `points`). Triangles keep the
/// polygon's winding. Falls back to a fan when earcut cannot produce a
/// full triangulation.
pub fn ear_clip(points: &[Point3<f64>], polygon: &[usize]) -> Vec<[usize; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    if polygon.len() == 3 {
        return vec![[polygon[0], polygon[1], polygon[2]]];
    }

    let Some(normal) = newell_normal(points, polygon).try_normalize(EAR_EPSILON) else {
        return fan(polygon);
    };

    // (u, v, normal) is right-handed, so the loop runs counter-clockwise in 2D
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u_axis = normal.cross(&helper).normalize();
    let v_axis = normal.cross(&u_axis);

    let projected: Vec<Vector2<f64>> = polygon
        .iter()
        .map(|&i| {
            let p = points[i].coords;
            Vector2::new(p.dot(&u_axis), p.dot(&v_axis))
        })
        .collect();
    let flattened: Vec<f64> = projected.iter().flat_map(|p| [p.x, p.y]).collect();

    let indices = match earcut(&flattened, &[], 2) {
        Ok(indices) => indices,
        Err(_) => return fan(polygon),
    };
    // Earcut drops repeated corners; anything short of n - 2 leaves a gap
    if indices.len() != 3 * (polygon.len() - 2) {
        return fan(polygon);
    }

    indices
        .chunks_exact(3)
        .map(|tri| {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            if cross(projected[a], projected[b], projected[c]) < 0.0 {
                [polygon[a], polygon[c], polygon[b]]
            } else {
                [polygon[a], polygon[b], polygon[c]]
            }
        })
        .collect()
}

fn fan(polygon: &[usize]) -> Vec<[usize; 3]> {
    polygon[1..]
        .windows(2)
        .map(|pair| [polygon[0], pair[0], pair[1]])
        .collect()
}

fn cross(o: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    (a - o).perp(&(b - o))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn area(points: &[Point3<f64>], triangles: &[[usize; 3]]) -> Vector3<f64> {
        triangles
            .iter()
            .map(|&[a, b, c]| (points[b] - points[a]).cross(&(points[c] - points[a])) / 2.0)
            .sum()
    }

    #[test]
    fn test_concave_l_shape() {
        // Three unit squares forming an L in the z = 1 plane
        let points = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        ];
        let polygon: Vec<usize> = (0..6).collect();
        let triangles = ear_clip(&points, &polygon);

        assert_eq!(triangles.len(), 4);
        for &[a, b, c] in &triangles {
            let n = (points[b] - points[a]).cross(&(points[c] - points[a]));
            assert!(n.z > 0.0, "triangle flipped: {:?}", [a, b, c]);
        }
        assert_relative_eq!(area(&points, &triangles), Vector3::new(0.0, 0.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_loop_keeps_reversed_winding() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let triangles = ear_clip(&points, &[0, 1, 2, 3]);
        assert_eq!(triangles.len(), 2);
        assert_relative_eq!(area(&points, &triangles), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_newell_normal_of_tilted_square() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let normal = newell_normal(&points, &[0, 1, 2, 3]);
        assert_relative_eq!(normal.norm(), 2.0 * 2f64.sqrt(), epsilon = 1e-12);
        assert!(normal.z > 0.0 && normal.y < 0.0);
    }

    #[test]
    fn test_collinear_loop_falls_back_to_fan() {
        let points: Vec<Point3<f64>> = (0..4).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        assert_eq!(ear_clip(&points, &[0, 1, 2, 3]).len(), 2);
    }
}
