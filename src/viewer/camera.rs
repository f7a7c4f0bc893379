// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Orthographic trackball camera

use crate::geometry::BoundingBox;
use egui::{Pos2, Rect, Vec2};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use std::f64::consts::PI;

/// Radians per dragged pixel
const ROTATE_SPEED: f64 = 0.01;
/// Margin kept around the fitted bounds
const FIT_MARGIN: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackballCamera {
    /// World point kept at the viewport centre
    pub target: Point3<f64>,
    /// World to view rotation; view x is right, y up, z towards the viewer
    pub rotation: UnitQuaternion<f64>,
    /// Half of the visible height in world units
    pub half_height: f64,
    home: (Point3<f64>, UnitQuaternion<f64>, f64),
}

impl TrackballCamera {
    /// Three-quarter view from above, framing `bbox`
    pub fn fit(bbox: &BoundingBox) -> Self {
        let (target, radius) = if bbox.is_empty() {
            (Point3::origin(), 1.0)
        } else {
            (bbox.center(), bbox.diagonal() / 2.0)
        };
        let radius = if radius > f64::EPSILON { radius } else { 1.0 };

        let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -PI / 3.0)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -PI / 4.0);
        let half_height = radius * FIT_MARGIN;

        Self {
            target,
            rotation,
            half_height,
            home: (target, rotation, half_height),
        }
    }

    pub fn reset(&mut self) {
        (self.target, self.rotation, self.half_height) = self.home;
    }

    /// Horizontal drag spins about the screen's vertical axis, vertical
    /// drag about its horizontal axis
    pub fn rotate(&mut self, drag: Vec2) {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), drag.x as f64 * ROTATE_SPEED);
        let pitch =
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), drag.y as f64 * ROTATE_SPEED);
        self.rotation = yaw * pitch * self.rotation;
    }

    /// Factors below 1 zoom in
    pub fn zoom(&mut self, factor: f64) {
        self.half_height = (self.half_height * factor).clamp(1e-9, 1e12);
    }

    /// Move the target so the scene follows the pointer
    pub fn pan(&mut self, drag: Vec2, viewport: Rect) {
        let per_pixel = self.world_per_pixel(viewport);
        let offset = Vector3::new(-drag.x as f64 * per_pixel, drag.y as f64 * per_pixel, 0.0);
        self.target += self.rotation.inverse_transform_vector(&offset);
    }

    /// View-space coordinates of a world point
    pub fn to_view(&self, point: &Point3<f64>) -> Vector3<f64> {
        self.rotation * (point - self.target)
    }

    pub fn to_view_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * direction
    }

    /// Screen position and depth (larger is nearer) of a world point
    pub fn project(&self, point: &Point3<f64>, viewport: Rect) -> (Pos2, f64) {
        let view = self.to_view(point);
        let scale = 1.0 / self.world_per_pixel(viewport);
        let center = viewport.center();
        let screen = Pos2::new(
            center.x + (view.x * scale) as f32,
            center.y - (view.y * scale) as f32,
        );
        (screen, view.z)
    }

    fn world_per_pixel(&self, viewport: Rect) -> f64 {
        2.0 * self.half_height / (viewport.height().max(1.0) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_fit_centres_target() {
        let camera = TrackballCamera::fit(&unit_box());
        let (screen, _) = camera.project(&Point3::origin(), viewport());

        assert_relative_eq!(screen.x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 300.0, epsilon = 1e-3);
        assert_relative_eq!(camera.half_height, 3f64.sqrt() * FIT_MARGIN, epsilon = 1e-12);
    }

    #[test]
    fn test_world_up_points_up_on_screen() {
        let camera = TrackballCamera::fit(&unit_box());
        let (top, _) = camera.project(&Point3::new(0.0, 0.0, 1.0), viewport());
        assert!(top.y < 300.0);
    }

    #[test]
    fn test_zoom_and_reset() {
        let mut camera = TrackballCamera::fit(&unit_box());
        let home = camera;

        camera.zoom(0.5);
        camera.rotate(Vec2::new(40.0, -10.0));
        camera.pan(Vec2::new(5.0, 5.0), viewport());
        assert_ne!(camera, home);

        camera.reset();
        assert_eq!(camera, home);
    }

    #[test]
    fn test_pan_follows_pointer() {
        let mut camera = TrackballCamera::fit(&unit_box());
        let before = camera.project(&Point3::origin(), viewport()).0;

        camera.pan(Vec2::new(20.0, -10.0), viewport());
        let after = camera.project(&Point3::origin(), viewport()).0;

        assert_relative_eq!(after.x - before.x, 20.0, epsilon = 1e-3);
        assert_relative_eq!(after.y - before.y, -10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_empty_bounds_fit_unit_view() {
        let camera = TrackballCamera::fit(&BoundingBox::empty());
        assert_eq!(camera.target, Point3::origin());
        assert_relative_eq!(camera.half_height, FIT_MARGIN);
    }
}
