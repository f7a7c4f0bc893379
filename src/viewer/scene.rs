// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Owned collection of coloured meshes to display

use crate::geometry::{BoundingBox, Mesh};
use egui::Color32;

/// Colour used when a mesh has no colour of its own
pub const DEFAULT_COLOR: Color32 = Color32::WHITE;

/// One mesh with its display colour
#[derive(Debug, Clone)]
pub struct Actor {
    pub mesh: Mesh,
    pub color: Color32,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    actors: Vec<Actor>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actor `i` gets `colors[i]`, or white when the slice is shorter
    pub fn from_meshes(meshes: Vec<Mesh>, colors: &[Color32]) -> Self {
        let mut scene = Self::new();
        for (i, mesh) in meshes.into_iter().enumerate() {
            scene.add_actor(mesh, colors.get(i).copied().unwrap_or(DEFAULT_COLOR));
        }
        scene
    }

    pub fn add_actor(&mut self, mesh: Mesh, color: Color32) {
        self.actors.push(Actor { mesh, color });
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn is_empty(&self) -> bool {
        self.actors.iter().all(|actor| actor.mesh.is_empty())
    }

    pub fn triangle_count(&self) -> usize {
        self.actors.iter().map(|a| a.mesh.triangle_count()).sum()
    }

    /// Bounds over every actor; empty when no actor has vertices
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for vertex in self.actors.iter().flat_map(|a| &a.mesh.vertices) {
            bbox.expand_to_include(&vertex.position);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::make_sphere;
    use nalgebra::Point3;

    #[test]
    fn test_missing_colors_default_to_white() {
        let meshes = vec![
            make_sphere(Point3::origin(), 1.0).unwrap(),
            make_sphere(Point3::new(3.0, 0.0, 0.0), 1.0).unwrap(),
        ];
        let scene = Scene::from_meshes(meshes, &[Color32::RED]);

        assert_eq!(scene.actors().len(), 2);
        assert_eq!(scene.actors()[0].color, Color32::RED);
        assert_eq!(scene.actors()[1].color, Color32::WHITE);
        assert_eq!(scene.triangle_count(), 192);
    }

    #[test]
    fn test_bounding_box_spans_all_actors() {
        let mut scene = Scene::new();
        scene.add_actor(make_sphere(Point3::origin(), 1.0).unwrap(), DEFAULT_COLOR);
        scene.add_actor(make_sphere(Point3::new(0.0, 0.0, 5.0), 1.0).unwrap(), DEFAULT_COLOR);

        let bbox = scene.bounding_box();
        assert_eq!(bbox.min.z, -1.0);
        assert_eq!(bbox.max.z, 6.0);
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::from_meshes(vec![Mesh::empty()], &[]);
        assert!(scene.is_empty());
        assert!(scene.bounding_box().is_empty());
    }
}
