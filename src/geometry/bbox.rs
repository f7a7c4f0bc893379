// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use super::{Mesh, Vertex};
use crate::error::{MeshBoolError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut bbox = Self::empty();
        for vertex in vertices {
            bbox.expand_to_include(&vertex.position);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Euclidean length of the extent vector
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Bounds as `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }
}

/// Center and diagonal length of a mesh's axis-aligned bounds
pub fn bounds_of(mesh: &Mesh) -> Result<(Point3<f64>, f64)> {
    let bbox = mesh.bounding_box();
    if bbox.is_empty() {
        return Err(MeshBoolError::EmptyMesh);
    }
    Ok((bbox.center(), bbox.diagonal()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        bbox.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        bbox.expand_to_include(&Point3::new(-1.0, -2.0, -3.0));

        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.to_array(), [-1.0, 1.0, -2.0, 2.0, -3.0, 3.0]);
    }

    #[test]
    fn test_bounds_of_unit_cube() {
        let corners = (0..8)
            .map(|i| {
                Point3::new(
                    (i & 1) as f64,
                    ((i >> 1) & 1) as f64,
                    ((i >> 2) & 1) as f64,
                )
            })
            .collect();
        let mesh = Mesh::from_parts(corners, vec![[0, 1, 3], [0, 3, 2]]).unwrap();

        let (center, diagonal) = bounds_of(&mesh).unwrap();
        assert_eq!(center, Point3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(diagonal, 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_of_single_point() {
        let mesh = Mesh::from_parts(vec![Point3::new(4.0, -2.0, 7.5)], Vec::new()).unwrap();

        let (center, diagonal) = bounds_of(&mesh).unwrap();
        assert_eq!(center, Point3::new(4.0, -2.0, 7.5));
        assert_eq!(diagonal, 0.0);
    }

    #[test]
    fn test_bounds_of_empty_mesh() {
        assert!(matches!(bounds_of(&Mesh::empty()), Err(MeshBoolError::EmptyMesh)));
    }
}
