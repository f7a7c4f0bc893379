// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CPU flat shading of a scene into one painter mesh

use super::{Scene, TrackballCamera};
use egui::{Color32, Pos2, Rect};

const AMBIENT: f32 = 0.25;
const DIFFUSE: f32 = 0.75;

struct ShadedTriangle {
    corners: [Pos2; 3],
    depth: f64,
    color: Color32,
}

/// Project, shade and depth sort every triangle, far to near.
///
/// The light sits at the camera. Faces turned away are lit by the same
/// rule so open meshes stay readable from inside.
pub fn paint_scene(scene: &Scene, camera: &TrackballCamera, viewport: Rect) -> egui::Mesh {
    let mut shaded = Vec::with_capacity(scene.triangle_count());

    for actor in scene.actors() {
        let projected: Vec<(Pos2, f64)> = actor
            .mesh
            .vertices
            .iter()
            .map(|v| camera.project(&v.position, viewport))
            .collect();

        for triangle in &actor.mesh.triangles {
            let [a, b, c] = actor.mesh.corners(triangle);
            let normal = (b - a).cross(&(c - a));
            let Some(normal) = camera.to_view_direction(&normal).try_normalize(1e-12) else {
                continue;
            };

            let [i, j, k] = triangle.indices;
            shaded.push(ShadedTriangle {
                corners: [projected[i].0, projected[j].0, projected[k].0],
                depth: (projected[i].1 + projected[j].1 + projected[k].1) / 3.0,
                color: shade(actor.color, AMBIENT + DIFFUSE * normal.z.abs() as f32),
            });
        }
    }

    shaded.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    let mut mesh = egui::Mesh::default();
    for triangle in shaded {
        let base = mesh.vertices.len() as u32;
        for corner in triangle.corners {
            mesh.colored_vertex(corner, triangle.color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    mesh
}

/// Scale a colour's RGB by `brightness` in `[0, 1]`
pub fn shade(color: Color32, brightness: f32) -> Color32 {
    let brightness = brightness.clamp(0.0, 1.0);
    let scale = |channel: u8| (channel as f32 * brightness).round() as u8;
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{make_sphere, Mesh};
    use egui::Vec2;
    use nalgebra::Point3;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(640.0, 480.0))
    }

    #[test]
    fn test_shade_scales_channels() {
        assert_eq!(shade(Color32::WHITE, 0.5), Color32::from_rgb(128, 128, 128));
        assert_eq!(shade(Color32::from_rgb(200, 100, 0), 1.5), Color32::from_rgb(200, 100, 0));
        assert_eq!(shade(Color32::WHITE, -1.0), Color32::BLACK);
    }

    #[test]
    fn test_one_painter_triangle_per_face() {
        let scene = Scene::from_meshes(vec![make_sphere(Point3::origin(), 1.0).unwrap()], &[]);
        let camera = TrackballCamera::fit(&scene.bounding_box());

        let mesh = paint_scene(&scene, &camera, viewport());
        assert_eq!(mesh.indices.len(), 96 * 3);
        assert_eq!(mesh.vertices.len(), 96 * 3);
        assert!(mesh.vertices.iter().all(|v| viewport().contains(v.pos)));
    }

    #[test]
    fn test_nearest_triangle_painted_last() {
        let near = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let far = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, -1.0),
                Point3::new(1.0, 0.0, -1.0),
                Point3::new(0.0, 1.0, -1.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let scene = Scene::from_meshes(vec![near, far], &[Color32::RED, Color32::BLUE]);
        let camera = TrackballCamera::fit(&scene.bounding_box());
        let mesh = paint_scene(&scene, &camera, viewport());

        // World +z leans towards the viewer in the default view
        let (first, last) = (mesh.vertices[0].color, mesh.vertices[3].color);
        assert!(first.b() > 0 && first.r() == 0);
        assert!(last.r() > 0 && last.b() == 0);
    }

    #[test]
    fn test_degenerate_faces_are_skipped() {
        let flat = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let scene = Scene::from_meshes(vec![flat], &[]);
        let camera = TrackballCamera::fit(&scene.bounding_box());
        assert!(paint_scene(&scene, &camera, viewport()).is_empty());
    }
}
