// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tag panel.
//!
//! Lists the project's tags, lets the user arm tags for the selected
//! regions and define new tags.

use super::surface::parse_hex_color;
use tagcanvas::TagDefinition;

/// Colors handed out to new tags in turn.
const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

/// Result of tag panel interaction.
pub enum TagsAction {
    None,
    /// A tag was armed or disarmed; the selection toggles just this tag.
    Toggled(String),
    /// A new tag was defined.
    AddTag(TagDefinition),
}

/// Display the tag panel.
pub fn show(
    ui: &mut egui::Ui,
    project_tags: &[TagDefinition],
    armed: &mut Vec<String>,
    new_tag_name: &mut String,
    selected_count: usize,
) -> TagsAction {
    let mut action = TagsAction::None;

    ui.heading("Tags");
    ui.label(egui::RichText::new(format!("{} regions selected", selected_count)).weak());
    ui.separator();

    for tag in project_tags {
        let mut is_armed = armed.contains(&tag.name);
        ui.horizontal(|ui| {
            let color = parse_hex_color(&tag.color).unwrap_or(egui::Color32::GRAY);
            if ui.checkbox(&mut is_armed, "").changed() {
                if is_armed {
                    armed.push(tag.name.clone());
                } else {
                    armed.retain(|name| name != &tag.name);
                }
                action = TagsAction::Toggled(tag.name.clone());
            }
            ui.colored_label(color, &tag.name);
        });
    }

    if project_tags.is_empty() {
        ui.label(egui::RichText::new("No tags defined yet").italics().weak());
    }

    ui.separator();
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(new_tag_name);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Add").clicked() || submitted {
            let name = new_tag_name.trim().to_string();
            if !name.is_empty() && !project_tags.iter().any(|tag| tag.name == name) {
                let color = PALETTE[project_tags.len() % PALETTE.len()];
                action = TagsAction::AddTag(TagDefinition::new(name, color));
                new_tag_name.clear();
            }
        }
    });

    action
}
