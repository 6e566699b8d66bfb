// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rendering-surface capability.
//!
//! The surface draws regions over the visual content and reports user
//! interaction. The canvas controller consumes it through the
//! [`RenderingSurface`] trait and never looks inside it.

use crate::models::region::{RegionId, RegionType};
use crate::util::geometry::{BoundingBox, Display, Point, Scale, Size, Source};
use std::sync::mpsc::Receiver;

/// Shape kinds understood by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Polygon,
    Point,
    Polyline,
}

impl ShapeKind {
    pub fn from_region_type(region_type: RegionType) -> Self {
        match region_type {
            RegionType::Rectangle => ShapeKind::Rect,
            RegionType::Polygon => ShapeKind::Polygon,
            RegionType::Point => ShapeKind::Point,
            RegionType::Polyline => ShapeKind::Polyline,
        }
    }
}

impl RegionType {
    pub fn from_shape_kind(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rect => RegionType::Rectangle,
            ShapeKind::Polygon => RegionType::Polygon,
            ShapeKind::Point => RegionType::Point,
            ShapeKind::Polyline => RegionType::Polyline,
        }
    }
}

/// Region geometry as the surface sees it, in coordinate space `S`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometry<S> {
    pub kind: ShapeKind,
    pub bounding_box: BoundingBox<S>,
    pub points: Vec<Point<S>>,
}

impl<S> SurfaceGeometry<S> {
    pub fn new(kind: ShapeKind, bounding_box: BoundingBox<S>, points: Vec<Point<S>>) -> Self {
        Self {
            kind,
            bounding_box,
            points,
        }
    }

    /// Geometry whose bounding box is derived from its points.
    pub fn from_points(kind: ShapeKind, points: Vec<Point<S>>) -> Option<Self> {
        let bounding_box = BoundingBox::from_points(&points)?;
        Some(Self::new(kind, bounding_box, points))
    }

    /// Rectangle geometry with its four corners as points, clockwise.
    pub fn rect(bounding_box: BoundingBox<S>) -> Self {
        let points = vec![
            Point::new(bounding_box.left, bounding_box.top),
            Point::new(bounding_box.right(), bounding_box.top),
            Point::new(bounding_box.right(), bounding_box.bottom()),
            Point::new(bounding_box.left, bounding_box.bottom()),
        ];
        Self::new(ShapeKind::Rect, bounding_box, points)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl SurfaceGeometry<Display> {
    pub fn to_source(&self, scale: &Scale) -> SurfaceGeometry<Source> {
        SurfaceGeometry {
            kind: self.kind,
            bounding_box: scale.box_to_source(self.bounding_box),
            points: self.points.iter().map(|p| scale.to_source(*p)).collect(),
        }
    }
}

impl SurfaceGeometry<Source> {
    pub fn to_display(&self, scale: &Scale) -> SurfaceGeometry<Display> {
        SurfaceGeometry {
            kind: self.kind,
            bounding_box: scale.box_to_display(self.bounding_box),
            points: self.points.iter().map(|p| scale.to_display(*p)).collect(),
        }
    }
}

/// One rendered tag chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
    pub name: String,
    pub color: String,
}

/// Tags of a region resolved against the project's definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagDescriptor {
    pub chips: Vec<TagChip>,
}

impl TagDescriptor {
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Chip whose color outlines the region.
    pub fn primary(&self) -> Option<&TagChip> {
        self.chips.first()
    }
}

/// Drawing behaviour of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Select and move existing regions only.
    #[default]
    None,
    Point,
    Rect,
    /// Stamp a rectangle of the template size on click.
    CopyRect,
    Polyline,
    Polygon,
}

/// Visual content bound as the surface background.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSource {
    /// Id of the asset the content belongs to.
    pub asset_id: String,
    /// Native pixel size of the content.
    pub native_size: Size,
    /// Where the content currently sits on screen.
    pub display_box: BoundingBox<Display>,
}

/// Interaction reported by the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The user finished drawing a new shape.
    SelectionEnd(SurfaceGeometry<Display>),
    /// The user finished dragging a region.
    RegionMove {
        id: RegionId,
        geometry: SurfaceGeometry<Display>,
    },
    RegionDelete(RegionId),
    RegionSelected(RegionId),
}

/// Completion signal of [`RenderingSurface::add_content_source`].
pub type ContentBind = Receiver<Result<(), String>>;

/// Drawing surface consumed by the canvas controller.
///
/// Geometry going in is in display space and geometry coming out of the
/// scale calls is in source space; the surface owns the current scale.
pub trait RenderingSurface {
    /// Open the event stream. The surface delivers every interaction on the
    /// returned channel until it is dropped.
    fn subscribe(&mut self) -> Receiver<SurfaceEvent>;

    fn set_selection_mode(&mut self, mode: SelectionMode, template: Option<Size>);

    /// Bind new background content. Completion is reported on the returned
    /// channel; the content geometry is not valid before then.
    fn add_content_source(&mut self, content: &ContentSource) -> ContentBind;

    /// Position the surface exactly over the content's on-screen box.
    fn set_overlay(&mut self, bounds: BoundingBox<Display>);

    fn set_enabled(&mut self, enabled: bool);

    fn add_region(&mut self, id: &RegionId, geometry: SurfaceGeometry<Display>, tags: TagDescriptor);

    fn delete_region(&mut self, id: &RegionId);

    fn delete_all_regions(&mut self);

    fn update_region_tags(&mut self, id: &RegionId, tags: TagDescriptor);

    fn scale_region_to_source_size(&self, geometry: &SurfaceGeometry<Display>) -> SurfaceGeometry<Source>;

    fn scale_region_to_display_size(&self, geometry: &SurfaceGeometry<Source>) -> SurfaceGeometry<Display>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_mapping_is_symmetric() {
        for region_type in [
            RegionType::Rectangle,
            RegionType::Polygon,
            RegionType::Point,
            RegionType::Polyline,
        ] {
            let kind = ShapeKind::from_region_type(region_type);
            assert_eq!(RegionType::from_shape_kind(kind), region_type);
        }
    }

    #[test]
    fn test_rect_geometry_has_four_corners() {
        let geometry = SurfaceGeometry::<Display>::rect(BoundingBox::new(10.0, 10.0, 50.0, 50.0));

        assert_eq!(geometry.points.len(), 4);
        assert_eq!(geometry.points[2], Point::new(60.0, 60.0));
    }
}
