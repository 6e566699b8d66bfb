// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! TagCanvas
//!
//! A desktop window for tagging regions on images: draw rectangles,
//! polygons, polylines and points, attach project tags to them, and
//! copy/paste regions between spots on the canvas.

mod app;
mod io;
mod ui;

use anyhow::Result;
use app::TagCanvasApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("TagCanvas"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "TagCanvas",
        options,
        Box::new(|_cc| Ok(Box::new(TagCanvasApp::new()?))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
