// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric primitives tagged with their coordinate space.
//!
//! Regions live in two spaces: the *source* space of the original image or
//! video frame, and the *display* space of the surface that renders it at
//! its current on-screen size. Points and boxes carry the space as a type
//! parameter so a value can only cross between the two through [`Scale`].

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Pixel space of the original asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Source;

/// Pixel space of the rendering surface, relative to its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Display;

/// A 2D point in the coordinate space `S`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> Point<S> {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    /// Shift the point by `(dx, dy)` without leaving its space.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An axis-aligned box in the coordinate space `S`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BoundingBox<S> {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> BoundingBox<S> {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            space: PhantomData,
        }
    }

    /// Smallest box containing every point; `None` for an empty slice.
    pub fn from_points(points: &[Point<S>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn top_left(&self) -> Point<S> {
        Point::new(self.left, self.top)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: &Point<S>) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y >= self.top && point.y <= self.bottom()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A width/height pair with no position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Ratio between the rendered size of an asset and its native size.
///
/// A factor of 0.5 means one display pixel covers two source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    x: f64,
    y: f64,
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };

    /// Scale from a uniform display/source factor.
    pub const fn uniform(factor: f64) -> Self {
        Self {
            x: factor,
            y: factor,
        }
    }

    /// Scale for content of `native` size rendered at `rendered` size.
    /// Degenerate sizes fall back to the identity.
    pub fn between(native: Size, rendered: Size) -> Self {
        if native.is_empty() || rendered.is_empty() {
            return Self::IDENTITY;
        }
        Self {
            x: rendered.width / native.width,
            y: rendered.height / native.height,
        }
    }

    pub fn to_source(&self, point: Point<Display>) -> Point<Source> {
        Point::new(point.x / self.x, point.y / self.y)
    }

    pub fn to_display(&self, point: Point<Source>) -> Point<Display> {
        Point::new(point.x * self.x, point.y * self.y)
    }

    pub fn box_to_source(&self, bounds: BoundingBox<Display>) -> BoundingBox<Source> {
        BoundingBox::new(
            bounds.left / self.x,
            bounds.top / self.y,
            bounds.width / self.x,
            bounds.height / self.y,
        )
    }

    pub fn box_to_display(&self, bounds: BoundingBox<Source>) -> BoundingBox<Display> {
        BoundingBox::new(
            bounds.left * self.x,
            bounds.top * self.y,
            bounds.width * self.x,
            bounds.height * self.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_to_source_at_half_scale() {
        let scale = Scale::between(Size::new(1920.0, 1080.0), Size::new(960.0, 540.0));
        let source = scale.to_source(Point::<Display>::new(10.0, 30.0));

        assert!((source.x - 20.0).abs() < 0.0001);
        assert!((source.y - 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_box_roundtrip_through_display() {
        let scale = Scale::between(Size::new(800.0, 600.0), Size::new(200.0, 300.0));
        let original = BoundingBox::<Source>::new(40.0, 60.0, 400.0, 120.0);

        let display = scale.box_to_display(original);
        assert!((display.left - 10.0).abs() < 0.0001);
        assert!((display.top - 30.0).abs() < 0.0001);

        let back = scale.box_to_source(display);
        assert!((back.width - original.width).abs() < 0.0001);
        assert!((back.height - original.height).abs() < 0.0001);
    }

    #[test]
    fn test_degenerate_sizes_use_identity() {
        assert_eq!(Scale::between(Size::new(0.0, 100.0), Size::new(50.0, 50.0)), Scale::IDENTITY);
        assert_eq!(Scale::between(Size::new(100.0, 100.0), Size::new(0.0, 0.0)), Scale::IDENTITY);
    }

    #[test]
    fn test_bounds_from_points() {
        let points = [
            Point::<Source>::new(5.0, 8.0),
            Point::new(1.0, 12.0),
            Point::new(9.0, 2.0),
        ];
        let bounds = BoundingBox::from_points(&points).unwrap();

        assert_eq!(bounds, BoundingBox::new(1.0, 2.0, 8.0, 10.0));
        assert!(BoundingBox::<Source>::from_points(&[]).is_none());
    }

    #[test]
    fn test_point_serializes_without_space_marker() {
        let json = serde_json::to_string(&Point::<Source>::new(1.5, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":2.0}"#);
    }
}
