// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! eframe application hosting the 3D view

use super::{render, Scene, TrackballCamera};
use egui::{Align2, Color32, FontId, Key, PointerButton, Rect, Response, Sense};

const WHEEL_ZOOM: f64 = 1.1;
/// Zoom factor exponent per pixel of right-button drag
const DRAG_ZOOM: f64 = 0.01;

pub struct ViewerApp {
    scene: Scene,
    camera: TrackballCamera,
    background: Color32,
}

impl ViewerApp {
    pub fn new(scene: Scene, background: Color32) -> Self {
        let camera = TrackballCamera::fit(&scene.bounding_box());
        Self {
            scene,
            camera,
            background,
        }
    }

    fn handle_input(&mut self, response: &Response, viewport: Rect) {
        if response.dragged_by(PointerButton::Primary) {
            self.camera.rotate(response.drag_delta());
        }
        if response.dragged_by(PointerButton::Secondary) {
            self.camera
                .zoom((response.drag_delta().y as f64 * DRAG_ZOOM).exp());
        }
        if response.dragged_by(PointerButton::Middle) {
            self.camera.pan(response.drag_delta(), viewport);
        }

        if response.hovered() {
            let scroll = response.ctx.input(|i| i.raw_scroll_delta.y);
            if scroll > 0.0 {
                self.camera.zoom(1.0 / WHEEL_ZOOM);
            } else if scroll < 0.0 {
                self.camera.zoom(WHEEL_ZOOM);
            }
        }

        if response.ctx.input(|i| i.key_pressed(Key::R)) {
            self.camera.reset();
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(self.background))
            .show(ctx, |ui| {
                let (viewport, response) =
                    ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
                self.handle_input(&response, viewport);

                let painter = ui.painter_at(viewport);
                painter.add(egui::Shape::mesh(render::paint_scene(
                    &self.scene,
                    &self.camera,
                    viewport,
                )));

                let status = if self.scene.is_empty() {
                    "empty result".to_string()
                } else {
                    format!("{} triangles", self.scene.triangle_count())
                };
                painter.text(
                    viewport.left_bottom() + egui::vec2(8.0, -8.0),
                    Align2::LEFT_BOTTOM,
                    format!("{status}  |  rotate: left  zoom: right/wheel  pan: middle  reset: R"),
                    FontId::monospace(12.0),
                    Color32::GRAY,
                );
            });
    }
}
