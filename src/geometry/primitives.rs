// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{Mesh, Triangle, Vertex};
use crate::error::{MeshBoolError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default number of points around each latitude ring
pub const DEFAULT_THETA_RESOLUTION: u32 = 8;
/// Default number of latitude samples from pole to pole, poles included
pub const DEFAULT_PHI_RESOLUTION: u32 = 8;

const MIN_RESOLUTION: u32 = 3;

/// Procedural UV sphere with its poles on the z axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereSource {
    pub center: Point3<f64>,
    pub radius: f64,
    pub theta_resolution: u32,
    pub phi_resolution: u32,
}

impl SphereSource {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius,
            theta_resolution: DEFAULT_THETA_RESOLUTION,
            phi_resolution: DEFAULT_PHI_RESOLUTION,
        }
    }

    /// Resolutions below 3 are raised to 3
    pub fn with_resolution(mut self, theta: u32, phi: u32) -> Self {
        self.theta_resolution = theta.max(MIN_RESOLUTION);
        self.phi_resolution = phi.max(MIN_RESOLUTION);
        self
    }

    /// Generate a closed, welded, outward-facing triangle mesh
    pub fn to_mesh(&self) -> Result<Mesh> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MeshBoolError::InvalidRadius(self.radius));
        }

        let theta_res = self.theta_resolution.max(MIN_RESOLUTION) as usize;
        let phi_res = self.phi_resolution.max(MIN_RESOLUTION) as usize;
        let rings = phi_res - 2;
        let c = self.center;
        let r = self.radius;

        let mut mesh = Mesh::with_capacity(2 + rings * theta_res, 2 * theta_res * (rings.max(1)));

        let north = mesh.add_vertex(Vertex::new(c + Vector3::new(0.0, 0.0, r), Vector3::z()));
        let south = mesh.add_vertex(Vertex::new(c - Vector3::new(0.0, 0.0, r), -Vector3::z()));

        let phi_step = PI / (phi_res - 1) as f64;
        let theta_step = 2.0 * PI / theta_res as f64;

        for i in 0..rings {
            let phi = phi_step * (i + 1) as f64;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for j in 0..theta_res {
                let (sin_theta, cos_theta) = (theta_step * j as f64).sin_cos();
                let dir = Vector3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi);
                mesh.add_vertex(Vertex::new(c + dir * r, dir));
            }
        }

        let ring = |i: usize, j: usize| 2 + i * theta_res + j % theta_res;

        for j in 0..theta_res {
            mesh.add_triangle(Triangle::new([north, ring(0, j), ring(0, j + 1)]));
        }

        for i in 0..rings - 1 {
            for j in 0..theta_res {
                let upper = ring(i, j);
                let upper_next = ring(i, j + 1);
                let lower = ring(i + 1, j);
                let lower_next = ring(i + 1, j + 1);
                mesh.add_triangle(Triangle::new([upper, lower, lower_next]));
                mesh.add_triangle(Triangle::new([upper, lower_next, upper_next]));
            }
        }

        let last = rings - 1;
        for j in 0..theta_res {
            mesh.add_triangle(Triangle::new([south, ring(last, j + 1), ring(last, j)]));
        }

        Ok(mesh)
    }
}

/// Generate a sphere mesh at the default resolution
pub fn make_sphere(center: Point3<f64>, radius: f64) -> Result<Mesh> {
    SphereSource::new(center, radius).to_mesh()
}

/// Geometric primitives
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn to_mesh(&self) -> Result<Mesh> {
        match self {
            Self::Cube { size, center } => Ok(generate_cube_mesh(*size, *center)),
        }
    }
}

/// Closed box sharing its eight corners between faces
fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = [
        // z+
        [4, 5, 6],
        [4, 6, 7],
        // z-
        [1, 0, 3],
        [1, 3, 2],
        // x+
        [5, 1, 2],
        [5, 2, 6],
        // x-
        [0, 4, 7],
        [0, 7, 3],
        // y+
        [7, 6, 2],
        [7, 2, 3],
        // y-
        [0, 1, 5],
        [0, 5, 4],
    ];

    let mut mesh = Mesh::with_capacity(8, 12);
    for position in positions {
        mesh.add_vertex(Vertex::at(position));
    }
    for indices in faces {
        mesh.add_triangle(Triangle::new(indices));
    }
    mesh.recompute_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh_utils::{is_closed, is_manifold, signed_volume};
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_default_counts() {
        let mesh = make_sphere(Point3::origin(), 1.0).unwrap();
        // 2 poles + 6 rings of 8
        assert_eq!(mesh.vertex_count(), 50);
        // 2 caps of 8 + 5 bands of 16
        assert_eq!(mesh.triangle_count(), 96);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = SphereSource::new(Point3::new(1.0, 2.0, 3.0), 0.5)
            .with_resolution(16, 12)
            .to_mesh()
            .unwrap();
        assert!(is_manifold(&mesh));
        assert!(is_closed(&mesh));
        assert!(signed_volume(&mesh) > 0.0);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let center = Point3::new(-3.0, 0.5, 10.0);
        let mesh = SphereSource::new(center, 2.5).to_mesh().unwrap();
        for vertex in &mesh.vertices {
            assert_relative_eq!((vertex.position - center).norm(), 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_rejects_non_positive_radius() {
        assert!(matches!(
            make_sphere(Point3::origin(), 0.0),
            Err(MeshBoolError::InvalidRadius(r)) if r == 0.0
        ));
        assert!(make_sphere(Point3::origin(), -1.0).is_err());
        assert!(make_sphere(Point3::origin(), f64::NAN).is_err());
    }

    #[test]
    fn test_sphere_minimum_resolution() {
        let mesh = SphereSource::new(Point3::origin(), 1.0)
            .with_resolution(1, 1)
            .to_mesh()
            .unwrap();
        assert!(is_closed(&mesh));
        assert_eq!(mesh.triangle_count(), 6);
    }

    #[test]
    fn test_cube_is_closed() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false)
            .to_mesh()
            .unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(is_closed(&mesh));
        assert_relative_eq!(signed_volume(&mesh), 1000.0, epsilon = 1e-9);
    }
}
