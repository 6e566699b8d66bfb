// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! egui rendering surface.
//!
//! Paints the bound image and the regions over it, and turns pointer
//! gestures into [`SurfaceEvent`]s for the canvas controller. Region
//! geometry is kept in display space relative to the overlay's top-left
//! corner; the overlay itself is positioned in screen points.

use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Shape, Stroke, TextureHandle, Ui};
use std::sync::mpsc::{channel, Receiver, Sender};
use tagcanvas::canvas::surface::{
    ContentBind, ContentSource, RenderingSurface, SelectionMode, ShapeKind, SurfaceEvent, SurfaceGeometry, TagDescriptor,
};
use tagcanvas::util::geometry::{BoundingBox, Display, Point, Scale, Size, Source};
use tagcanvas::RegionId;

/// Smallest rectangle, in display pixels, that counts as a drawing.
const MIN_DRAWN_SIZE: f64 = 3.0;
/// Pick radius around points and polyline vertices.
const HIT_SLOP: f64 = 6.0;

struct SurfaceRegion {
    id: RegionId,
    geometry: SurfaceGeometry<Display>,
    tags: TagDescriptor,
}

#[derive(Default)]
enum Gesture {
    #[default]
    Idle,
    Drawing {
        start: Point<Display>,
        current: Point<Display>,
    },
    Moving {
        id: RegionId,
        last: Point<Display>,
    },
}

/// Drawing surface backed by egui painting and pointer input.
#[derive(Default)]
pub struct EguiSurface {
    events: Option<Sender<SurfaceEvent>>,
    regions: Vec<SurfaceRegion>,
    mode: SelectionMode,
    template: Option<Size>,
    enabled: bool,
    overlay: Option<BoundingBox<Display>>,
    native_size: Option<Size>,
    gesture: Gesture,
    vertices: Vec<Point<Display>>,
}

impl EguiSurface {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Paint the surface and handle this frame's pointer input.
    pub fn show(&mut self, ui: &mut Ui, texture: Option<&TextureHandle>, selected: &[RegionId]) {
        let Some(overlay) = self.overlay else {
            return;
        };
        let rect = Rect::from_min_size(
            egui::pos2(overlay.left as f32, overlay.top as f32),
            egui::vec2(overlay.width as f32, overlay.height as f32),
        );

        if let Some(texture) = texture {
            ui.painter().image(
                texture.id(),
                rect,
                Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if self.enabled {
            let response = ui.interact(rect, ui.id().with("region_surface"), Sense::click_and_drag());
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.vertices.clear();
                self.gesture = Gesture::Idle;
            }
            let pointer = response
                .interact_pointer_pos()
                .or(response.hover_pos())
                .map(|pos| to_local(rect, pos));
            self.handle_input(&response, pointer);
        }

        self.paint(ui, rect, selected);
    }

    fn handle_input(&mut self, response: &Response, pointer: Option<Point<Display>>) {
        match self.mode {
            SelectionMode::Rect => self.handle_rect_drawing(response, pointer),
            SelectionMode::Point => {
                if let (true, Some(pos)) = (response.clicked(), pointer) {
                    if let Some(geometry) = SurfaceGeometry::from_points(ShapeKind::Point, vec![pos]) {
                        self.emit(SurfaceEvent::SelectionEnd(geometry));
                    }
                }
            }
            SelectionMode::CopyRect => {
                if let (true, Some(pos), Some(size)) = (response.clicked(), pointer, self.template) {
                    let bounds = BoundingBox::new(pos.x, pos.y, size.width, size.height);
                    self.emit(SurfaceEvent::SelectionEnd(SurfaceGeometry::rect(bounds)));
                }
            }
            SelectionMode::Polygon => self.handle_vertices(response, pointer, ShapeKind::Polygon, 3),
            SelectionMode::Polyline => self.handle_vertices(response, pointer, ShapeKind::Polyline, 2),
            SelectionMode::None => self.handle_select_and_move(response, pointer),
        }
    }

    fn handle_rect_drawing(&mut self, response: &Response, pointer: Option<Point<Display>>) {
        if let (true, Some(pos)) = (response.drag_started(), pointer) {
            self.gesture = Gesture::Drawing {
                start: pos,
                current: pos,
            };
        }
        if let (Gesture::Drawing { current, .. }, Some(pos)) = (&mut self.gesture, pointer) {
            *current = pos;
        }
        if response.drag_stopped() {
            if let Gesture::Drawing { start, current } = std::mem::take(&mut self.gesture) {
                let bounds = BoundingBox::from_points(&[start, current]);
                if let Some(bounds) = bounds.filter(|b| b.width >= MIN_DRAWN_SIZE && b.height >= MIN_DRAWN_SIZE) {
                    self.emit(SurfaceEvent::SelectionEnd(SurfaceGeometry::rect(bounds)));
                }
            }
        }
    }

    fn handle_vertices(&mut self, response: &Response, pointer: Option<Point<Display>>, kind: ShapeKind, min: usize) {
        if response.double_clicked() {
            let vertices = std::mem::take(&mut self.vertices);
            if vertices.len() >= min {
                if let Some(geometry) = SurfaceGeometry::from_points(kind, vertices) {
                    self.emit(SurfaceEvent::SelectionEnd(geometry));
                }
            }
        } else if let (true, Some(pos)) = (response.clicked(), pointer) {
            let repeated = self
                .vertices
                .last()
                .is_some_and(|last| (last.x - pos.x).abs() < 1.0 && (last.y - pos.y).abs() < 1.0);
            if !repeated {
                self.vertices.push(pos);
            }
        }
    }

    fn handle_select_and_move(&mut self, response: &Response, pointer: Option<Point<Display>>) {
        if let (true, Some(pos)) = (response.drag_started(), pointer) {
            if let Some(id) = self.hit_test(pos) {
                self.emit(SurfaceEvent::RegionSelected(id.clone()));
                self.gesture = Gesture::Moving { id, last: pos };
            }
        }

        if let (Gesture::Moving { id, last }, Some(pos)) = (&mut self.gesture, pointer) {
            let (dx, dy) = (pos.x - last.x, pos.y - last.y);
            if let Some(region) = self.regions.iter_mut().find(|region| region.id == *id) {
                region.geometry.bounding_box = region.geometry.bounding_box.offset(dx, dy);
                for point in &mut region.geometry.points {
                    *point = point.offset(dx, dy);
                }
            }
            *last = pos;
        }

        if response.drag_stopped() {
            if let Gesture::Moving { id, .. } = std::mem::take(&mut self.gesture) {
                if let Some(region) = self.regions.iter().find(|region| region.id == id) {
                    let geometry = region.geometry.clone();
                    self.emit(SurfaceEvent::RegionMove { id, geometry });
                }
            }
        }

        if let (true, Some(pos)) = (response.clicked(), pointer) {
            if let Some(id) = self.hit_test(pos) {
                self.emit(SurfaceEvent::RegionSelected(id));
            }
        }
    }

    /// Topmost region under `pos`.
    fn hit_test(&self, pos: Point<Display>) -> Option<RegionId> {
        self.regions
            .iter()
            .rev()
            .find(|region| {
                let bounds = region.geometry.bounding_box;
                let padded = BoundingBox::new(
                    bounds.left - HIT_SLOP,
                    bounds.top - HIT_SLOP,
                    bounds.width + 2.0 * HIT_SLOP,
                    bounds.height + 2.0 * HIT_SLOP,
                );
                padded.contains(&pos)
            })
            .map(|region| region.id.clone())
    }

    fn emit(&self, event: SurfaceEvent) {
        if let Some(sender) = &self.events {
            if sender.send(event).is_err() {
                log::debug!("Surface event dropped, no subscriber");
            }
        }
    }

    fn scale(&self) -> Scale {
        match (self.native_size, self.overlay) {
            (Some(native), Some(overlay)) => Scale::between(native, overlay.size()),
            _ => Scale::IDENTITY,
        }
    }

    fn paint(&self, ui: &Ui, rect: Rect, selected: &[RegionId]) {
        let painter = ui.painter_at(rect);

        for region in &self.regions {
            let color = region
                .tags
                .primary()
                .and_then(|chip| parse_hex_color(&chip.color))
                .unwrap_or(Color32::YELLOW);
            let is_selected = selected.contains(&region.id);
            let stroke = if is_selected {
                Stroke::new(3.0, Color32::WHITE)
            } else {
                Stroke::new(2.0, color)
            };

            let points: Vec<Pos2> = region.geometry.points.iter().map(|p| to_screen(rect, *p)).collect();
            match region.geometry.kind {
                ShapeKind::Rect => {
                    let bounds = region.geometry.bounding_box;
                    let min = to_screen(rect, bounds.top_left());
                    let size = egui::vec2(bounds.width as f32, bounds.height as f32);
                    painter.rect_stroke(Rect::from_min_size(min, size), 0.0, stroke);
                }
                ShapeKind::Polygon => {
                    painter.add(Shape::closed_line(points.clone(), stroke));
                }
                ShapeKind::Polyline => {
                    painter.add(Shape::line(points.clone(), stroke));
                }
                ShapeKind::Point => {}
            }
            for point in &points {
                painter.circle_filled(*point, if is_selected { 5.0 } else { 4.0 }, color);
            }

            if !region.tags.is_empty() {
                let label: Vec<&str> = region.tags.chips.iter().map(|chip| chip.name.as_str()).collect();
                painter.text(
                    to_screen(rect, region.geometry.bounding_box.top_left()),
                    Align2::LEFT_BOTTOM,
                    label.join(", "),
                    FontId::proportional(12.0),
                    color,
                );
            }
        }

        let preview = Stroke::new(1.5, Color32::LIGHT_BLUE);
        if let Gesture::Drawing { start, current } = &self.gesture {
            painter.rect_stroke(
                Rect::from_two_pos(to_screen(rect, *start), to_screen(rect, *current)),
                0.0,
                preview,
            );
        }
        if !self.vertices.is_empty() {
            let points: Vec<Pos2> = self.vertices.iter().map(|p| to_screen(rect, *p)).collect();
            for point in &points {
                painter.circle_filled(*point, 4.0, Color32::WHITE);
                painter.circle_stroke(*point, 4.0, Stroke::new(1.0, Color32::BLACK));
            }
            painter.add(Shape::line(points, preview));
        }
    }
}

impl RenderingSurface for EguiSurface {
    fn subscribe(&mut self) -> Receiver<SurfaceEvent> {
        let (sender, receiver) = channel();
        self.events = Some(sender);
        receiver
    }

    fn set_selection_mode(&mut self, mode: SelectionMode, template: Option<Size>) {
        self.mode = mode;
        self.template = template;
        self.gesture = Gesture::Idle;
        self.vertices.clear();
    }

    fn add_content_source(&mut self, content: &ContentSource) -> ContentBind {
        // The host uploads the texture before handing over the content, so
        // binding completes immediately.
        let (sender, receiver) = channel();
        self.native_size = Some(content.native_size);
        let _ = sender.send(Ok(()));
        receiver
    }

    fn set_overlay(&mut self, bounds: BoundingBox<Display>) {
        self.overlay = Some(bounds);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.gesture = Gesture::Idle;
        self.vertices.clear();
    }

    fn add_region(&mut self, id: &RegionId, geometry: SurfaceGeometry<Display>, tags: TagDescriptor) {
        self.regions.retain(|region| &region.id != id);
        self.regions.push(SurfaceRegion {
            id: id.clone(),
            geometry,
            tags,
        });
    }

    fn delete_region(&mut self, id: &RegionId) {
        self.regions.retain(|region| &region.id != id);
    }

    fn delete_all_regions(&mut self) {
        self.regions.clear();
        self.gesture = Gesture::Idle;
    }

    fn update_region_tags(&mut self, id: &RegionId, tags: TagDescriptor) {
        if let Some(region) = self.regions.iter_mut().find(|region| &region.id == id) {
            region.tags = tags;
        }
    }

    fn scale_region_to_source_size(&self, geometry: &SurfaceGeometry<Display>) -> SurfaceGeometry<Source> {
        geometry.to_source(&self.scale())
    }

    fn scale_region_to_display_size(&self, geometry: &SurfaceGeometry<Source>) -> SurfaceGeometry<Display> {
        geometry.to_display(&self.scale())
    }
}

fn to_local(rect: Rect, pos: Pos2) -> Point<Display> {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn to_screen(rect: Rect, point: Point<Display>) -> Pos2 {
    egui::pos2(rect.min.x + point.x as f32, rect.min.y + point.y as f32)
}

/// Parse `#rrggbb` into a color.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color32::from_rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("00ff00"), Some(Color32::from_rgb(0, 255, 0)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_scale_follows_overlay_size() {
        let mut surface = EguiSurface::new();
        let content = ContentSource {
            asset_id: "a".into(),
            native_size: Size::new(800.0, 400.0),
            display_box: BoundingBox::new(0.0, 0.0, 400.0, 200.0),
        };
        let bind = surface.add_content_source(&content);
        assert_eq!(bind.try_recv(), Ok(Ok(())));
        surface.set_overlay(content.display_box);

        let drawn = SurfaceGeometry::<Display>::rect(BoundingBox::new(10.0, 10.0, 50.0, 50.0));
        let source = surface.scale_region_to_source_size(&drawn);
        assert_eq!(source.bounding_box, BoundingBox::new(20.0, 20.0, 100.0, 100.0));

        surface.set_overlay(BoundingBox::new(5.0, 5.0, 800.0, 400.0));
        let source = surface.scale_region_to_source_size(&drawn);
        assert_eq!(source.bounding_box, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost_region() {
        let mut surface = EguiSurface::new();
        surface.add_region(
            &RegionId::from("below"),
            SurfaceGeometry::rect(BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
            TagDescriptor::default(),
        );
        surface.add_region(
            &RegionId::from("above"),
            SurfaceGeometry::rect(BoundingBox::new(40.0, 40.0, 20.0, 20.0)),
            TagDescriptor::default(),
        );

        assert_eq!(surface.hit_test(Point::new(50.0, 50.0)), Some(RegionId::from("above")));
        assert_eq!(surface.hit_test(Point::new(10.0, 10.0)), Some(RegionId::from("below")));
        assert_eq!(surface.hit_test(Point::new(300.0, 300.0)), None);
    }
}
