// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for choosing the drawing tool the
//! canvas uses for new regions.

use tagcanvas::canvas::EditorMode;

/// Display the toolbar. Returns true when the tool changed.
pub fn show(ui: &mut egui::Ui, current_mode: &mut EditorMode) -> bool {
    let previous = *current_mode;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        let tools = [
            (EditorMode::Select, "⬆ Select"),
            (EditorMode::Rectangle, "▭ Rectangle"),
            (EditorMode::Polygon, "▱ Polygon"),
            (EditorMode::Polyline, "⟋ Polyline"),
            (EditorMode::Point, "• Point"),
            (EditorMode::CopyRect, "⧉ Copy Rect"),
        ];
        for (mode, label) in tools {
            if ui.selectable_label(*current_mode == mode, label).clicked() {
                *current_mode = mode;
            }
        }

        ui.separator();

        // Tool description
        let tool_text = match current_mode {
            EditorMode::Select | EditorMode::None => "Click to select (Shift adds), drag to move",
            EditorMode::Rectangle => "Drag to draw a rectangle",
            EditorMode::Polygon => "Click to add vertices, double-click to close polygon",
            EditorMode::Polyline => "Click to add points, double-click to finish line",
            EditorMode::Point => "Click to place a point",
            EditorMode::CopyRect => "Click to stamp a rectangle the size of the last drawing",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    *current_mode != previous
}
