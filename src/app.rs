// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the canvas controller, feeds it host
//! events (content loads, viewport changes, tool and tag choices, edit
//! commands) and adopts the metadata snapshots it hands back.

use crate::io::{media, serialization};
use crate::ui::{surface::EguiSurface, tags, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use tagcanvas::canvas::{CanvasProps, ContentSource, EditorMode};
use tagcanvas::util::geometry::{BoundingBox, Display, Size};
use tagcanvas::{Asset, AssetMetadata, CanvasController, CanvasError, MetadataUpdate, TagDefinition};

/// Data loaded in the background thread.
struct LoadedAsset {
    image: media::LoadedImage,
    metadata: AssetMetadata,
}

/// Main application state.
pub struct TagCanvasApp {
    /// Canvas core driving the egui surface
    canvas: CanvasController<EguiSurface>,

    /// Latest metadata snapshot adopted from the canvas
    asset: Option<AssetMetadata>,

    /// Loaded image texture for display
    image_texture: Option<egui::TextureHandle>,

    /// Screen rectangle the content was last bound or resized to
    content_box: Option<BoundingBox<Display>>,

    /// Currently selected drawing tool
    editor_mode: EditorMode,

    /// Tags armed in the tag panel
    armed_tags: Vec<String>,

    /// Text of the "new tag" field
    new_tag_name: String,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedAsset, String>>>,

    /// Loading state message
    loading_message: Option<String>,
}

impl TagCanvasApp {
    /// Create the application and bring up its canvas.
    pub fn new() -> Result<Self, CanvasError> {
        let mut canvas = CanvasController::new(EguiSurface::new(), CanvasProps::default());
        canvas.initialize()?;
        canvas.set_editor_mode(EditorMode::default());

        Ok(Self {
            canvas,
            asset: None,
            image_texture: None,
            content_box: None,
            editor_mode: EditorMode::default(),
            armed_tags: Vec::new(),
            new_tag_name: String::new(),
            image_loader: None,
            loading_message: None,
        })
    }

    /// Load an image file as a fresh asset (asynchronously).
    fn load_image_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedAsset, String> {
                let image = media::load_image(&path).map_err(|e| format!("{:#}", e))?;
                log::info!("Loaded image: {} ({}x{})", path.display(), image.width, image.height);

                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                let size = Size::new(image.width as f64, image.height as f64);
                let asset = Asset::new(name, path.to_string_lossy().to_string(), Some(size));
                Ok(LoadedAsset {
                    image,
                    metadata: AssetMetadata::new(asset),
                })
            })();

            let _ = sender.send(result);
        });
    }

    /// Import annotations from a file and load the image they refer to
    /// (asynchronously).
    fn import_annotations(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading annotations and image...".to_string());

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedAsset, String> {
                let mut metadata = serialization::import(&path).map_err(|e| format!("{:#}", e))?;
                log::info!("Imported {} regions from {}", metadata.regions.len(), path.display());

                let image_path = PathBuf::from(&metadata.asset.path);
                if !image_path.exists() {
                    return Err(format!("Referenced image not found: {}", image_path.display()));
                }
                let image = media::load_image(&image_path).map_err(|e| format!("{:#}", e))?;
                if metadata.asset.size.is_none() {
                    metadata.asset.size = Some(Size::new(image.width as f64, image.height as f64));
                }

                Ok(LoadedAsset { image, metadata })
            })();

            let _ = sender.send(result);
        });
    }

    /// Export the active asset's metadata to a file.
    fn export_annotations(&self, path: PathBuf) {
        let Some(metadata) = &self.asset else {
            return;
        };
        match serialization::export(metadata, &path) {
            Ok(()) => log::info!("Exported annotations to {}", path.display()),
            Err(e) => log::error!("Failed to export annotations: {:#}", e),
        }
    }

    /// Adopt a finished background load.
    fn finish_loading(&mut self, ctx: &egui::Context, loaded: LoadedAsset) {
        let size = [loaded.image.width as usize, loaded.image.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.image.pixels);
        self.image_texture = Some(ctx.load_texture("asset_image", color_image, egui::TextureOptions::LINEAR));

        self.asset = Some(loaded.metadata.clone());
        self.content_box = None;
        self.canvas.set_asset(loaded.metadata);
    }

    /// Adopt metadata snapshots handed back by the canvas.
    fn apply_updates(&mut self, updates: Vec<MetadataUpdate>) {
        for update in updates {
            log::debug!("Canvas change: {:?}", update.change);
            self.asset = Some(update.metadata);
        }
    }

    fn copy(&mut self) {
        self.canvas.copy_regions();
    }

    fn cut(&mut self) {
        let updates = self.canvas.cut_regions();
        self.apply_updates(updates);
    }

    fn paste(&mut self) {
        let updates = self.canvas.paste_regions();
        self.apply_updates(updates);
    }

    fn select_all(&mut self) {
        let updates = self.canvas.select_all_regions();
        self.apply_updates(updates);
    }

    fn delete_selected(&mut self) {
        let updates = self.canvas.remove_selected_regions();
        self.apply_updates(updates);
    }

    fn clear_all(&mut self) {
        let updates = self.canvas.clear_all_regions();
        self.apply_updates(updates);
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        self.canvas.set_multi_select(ctx.input(|i| i.modifiers.shift));

        if ctx.wants_keyboard_input() {
            return;
        }

        let (copy, cut, paste, select_all, delete) = ctx.input(|i| {
            let mut copy = false;
            let mut cut = false;
            let mut paste = false;
            for event in &i.events {
                match event {
                    egui::Event::Copy => copy = true,
                    egui::Event::Cut => cut = true,
                    egui::Event::Paste(_) => paste = true,
                    _ => {}
                }
            }
            (
                copy,
                cut,
                paste,
                i.modifiers.command && i.key_pressed(egui::Key::A),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            )
        });

        if copy {
            self.copy();
        }
        if cut {
            self.cut();
        }
        if paste {
            self.paste();
        }
        if select_all {
            self.select_all();
        }
        if delete {
            self.delete_selected();
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            self.load_image_file(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Load Annotations...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Annotations", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_annotations(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.add_enabled_ui(self.asset.is_some(), |ui| {
                        ui.menu_button("Export Annotations", |ui| {
                            if ui.button("Export as YAML...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("YAML", &["yaml", "yml"])
                                    .set_file_name("annotations.yaml")
                                    .save_file()
                                {
                                    self.export_annotations(path);
                                }
                                ui.close_menu();
                            }
                            if ui.button("Export as JSON...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON", &["json"])
                                    .set_file_name("annotations.json")
                                    .save_file()
                                {
                                    self.export_annotations(path);
                                }
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_selection = !self.canvas.selected_region_ids().is_empty();
                    if ui.add_enabled(has_selection, egui::Button::new("Copy (Ctrl+C)")).clicked() {
                        self.copy();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Cut (Ctrl+X)")).clicked() {
                        self.cut();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.canvas.has_clipboard(), egui::Button::new("Paste (Ctrl+V)"))
                        .clicked()
                    {
                        self.paste();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Select All (Ctrl+A)").clicked() {
                        self.select_all();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Delete Selected (Del)")).clicked() {
                        self.delete_selected();
                        ui.close_menu();
                    }
                    if ui.button("Clear All Regions").clicked() {
                        self.clear_all();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_tags_panel(&mut self, ctx: &egui::Context) {
        let project_tags = self.canvas.props().project_tags.clone();
        let selected_count = self.canvas.selected_region_ids().len();

        let action = egui::SidePanel::right("tags")
            .default_width(220.0)
            .show(ctx, |ui| {
                let action = tags::show(
                    ui,
                    &project_tags,
                    &mut self.armed_tags,
                    &mut self.new_tag_name,
                    selected_count,
                );

                if let Some(metadata) = &self.asset {
                    ui.separator();
                    ui.label(egui::RichText::new(&metadata.asset.name).strong());
                    ui.label(format!("State: {:?}", metadata.asset.state));
                    ui.label(format!("Regions: {}", metadata.regions.len()));
                }

                action
            })
            .inner;

        match action {
            tags::TagsAction::None => {}
            tags::TagsAction::Toggled(name) => {
                self.canvas.arm_tags(self.armed_tags.clone());
                let updates = self.canvas.toggle_selection_tag(&name);
                self.apply_updates(updates);
            }
            tags::TagsAction::AddTag(tag) => {
                log::info!("Added tag {} ({})", tag.name, tag.color);
                let mut project_tags: Vec<TagDefinition> = project_tags;
                project_tags.push(tag);
                self.canvas.set_project_tags(project_tags);
            }
        }
    }

    fn show_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref message) = self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
                return;
            }

            let Some(texture) = self.image_texture.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.label("Open an image (File > Open Image...) to start tagging");
                });
                return;
            };
            let Some(metadata) = &self.asset else {
                return;
            };

            let display_box = fit_image(ui.available_rect_before_wrap(), texture.size_vec2());
            match self.content_box {
                None => {
                    self.canvas.on_asset_loaded(ContentSource {
                        asset_id: metadata.asset.id.clone(),
                        native_size: Size::new(texture.size()[0] as f64, texture.size()[1] as f64),
                        display_box,
                    });
                    self.content_box = Some(display_box);
                }
                Some(previous) if previous != display_box => {
                    self.canvas.on_viewport_resize(display_box);
                    self.content_box = Some(display_box);
                }
                Some(_) => {}
            }

            let selected = self.canvas.selected_region_ids().to_vec();
            self.canvas.surface_mut().show(ui, Some(&texture), &selected);
        });
    }
}

/// Largest rectangle with the image's aspect ratio centered in `available`.
fn fit_image(available: egui::Rect, image_size: egui::Vec2) -> BoundingBox<Display> {
    let img_aspect = image_size.x / image_size.y;
    let available_aspect = available.width() / available.height();

    let (display_width, display_height) = if img_aspect > available_aspect {
        // Image is wider - fit to width
        (available.width(), available.width() / img_aspect)
    } else {
        // Image is taller - fit to height
        (available.height() * img_aspect, available.height())
    };

    let x_offset = (available.width() - display_width) / 2.0;
    let y_offset = (available.height() - display_height) / 2.0;

    BoundingBox::new(
        (available.min.x + x_offset).round() as f64,
        (available.min.y + y_offset).round() as f64,
        display_width.round() as f64,
        display_height.round() as f64,
    )
}

impl eframe::App for TagCanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background loading
        if let Some(ref receiver) = self.image_loader {
            if let Ok(result) = receiver.try_recv() {
                self.image_loader = None;
                self.loading_message = None;

                match result {
                    Ok(loaded) => self.finish_loading(ctx, loaded),
                    Err(e) => log::error!("Failed to load asset: {}", e),
                }
            }
        }

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        self.handle_keyboard(ctx);
        self.show_menu_bar(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if toolbar::show(ui, &mut self.editor_mode) {
                log::debug!("Tool changed to {:?}", self.editor_mode);
                self.canvas.set_editor_mode(self.editor_mode);
            }
        });

        self.show_tags_panel(ctx);
        self.show_canvas(ctx);

        let updates = self.canvas.poll();
        if !updates.is_empty() {
            self.apply_updates(updates);
            ctx.request_repaint();
        }
    }
}

impl Drop for TagCanvasApp {
    fn drop(&mut self) {
        self.canvas.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_image_wide_image_fills_width() {
        let available = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        let fitted = fit_image(available, egui::vec2(1600.0, 400.0));
        assert_eq!(fitted, BoundingBox::new(0.0, 200.0, 800.0, 200.0));
    }

    #[test]
    fn test_fit_image_tall_image_is_centered() {
        let available = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(800.0, 600.0));
        let fitted = fit_image(available, egui::vec2(300.0, 600.0));
        assert_eq!(fitted, BoundingBox::new(260.0, 20.0, 300.0, 600.0));
    }
}
