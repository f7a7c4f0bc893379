// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Interactive viewer - egui window painting CPU-shaded meshes

mod app;
mod camera;
mod render;
mod scene;

pub use app::ViewerApp;
pub use camera::TrackballCamera;
pub use render::{paint_scene, shade};
pub use scene::{Actor, Scene, DEFAULT_COLOR};

use crate::error::{MeshBoolError, Result};
use crate::geometry::Mesh;
use egui::Color32;
use tracing::debug;

/// Window settings
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub background: Color32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "meshbool".to_string(),
            width: 1024.0,
            height: 768.0,
            background: Color32::from_rgb(30, 30, 36),
        }
    }
}

/// Open a window showing `meshes` and block until it is closed.
/// `colors[i]` colours mesh `i`; meshes without one render white.
pub fn show(meshes: Vec<Mesh>, colors: &[Color32], options: &ViewerOptions) -> Result<()> {
    let scene = Scene::from_meshes(meshes, colors);
    debug!(
        actors = scene.actors().len(),
        triangles = scene.triangle_count(),
        "starting viewer"
    );

    let viewport = egui::ViewportBuilder::default()
        .with_title(options.title.clone())
        .with_inner_size([options.width, options.height]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let background = options.background;
    eframe::run_native(
        &options.title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(scene, background)))),
    )
    .map_err(|e| MeshBoolError::Viewer(e.to_string()))
}
