// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotation canvas core.
//!
//! [`CanvasController`] keeps three views of the current regions in step:
//! what the rendering surface shows (display space), the asset metadata
//! (source space) and the selection/clipboard state. Every mutation hands
//! the host a fresh metadata snapshot as a [`MetadataUpdate`].

pub mod clipboard;
pub mod controller;
pub mod helpers;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

pub use clipboard::Clipboard;
pub use controller::CanvasController;
pub use surface::{ContentSource, RenderingSurface, SelectionMode, ShapeKind, SurfaceEvent, SurfaceGeometry};

use crate::models::asset::AssetMetadata;
use crate::models::region::{RegionId, RegionType};
use crate::models::tag::TagDefinition;
use serde::{Deserialize, Serialize};

/// Errors reported by the canvas core.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas surface is already initialized")]
    AlreadyInitialized,
    #[error("canvas surface has been torn down")]
    TornDown,
}

/// Tunables of the canvas core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Shift applied to pasted regions, in source pixels.
    pub paste_margin: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            paste_margin: helpers::PASTE_MARGIN,
        }
    }
}

impl CanvasConfig {
    /// Replace unusable values with their defaults. A paste margin below
    /// [`helpers::MIN_PASTE_MARGIN`] (or not finite) could leave a pasted
    /// copy on top of its source.
    pub fn validated(self) -> Self {
        let paste_margin = if self.paste_margin.is_finite() && self.paste_margin >= helpers::MIN_PASTE_MARGIN {
            self.paste_margin
        } else {
            log::warn!(
                "Paste margin {} is unusable, falling back to {}",
                self.paste_margin,
                helpers::PASTE_MARGIN
            );
            helpers::PASTE_MARGIN
        };
        Self { paste_margin }
    }
}

/// Drawing tool chosen in the host's toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    Rectangle,
    Polygon,
    Polyline,
    Point,
    CopyRect,
    #[default]
    Select,
    None,
}

impl EditorMode {
    /// Type given to regions drawn in this mode, if the mode draws at all.
    pub fn region_type(self) -> Option<RegionType> {
        match self {
            EditorMode::Rectangle | EditorMode::CopyRect => Some(RegionType::Rectangle),
            EditorMode::Polygon => Some(RegionType::Polygon),
            EditorMode::Polyline => Some(RegionType::Polyline),
            EditorMode::Point => Some(RegionType::Point),
            EditorMode::Select | EditorMode::None => None,
        }
    }

    /// Surface selection mode matching this tool.
    pub fn selection_mode(self) -> SelectionMode {
        match self {
            EditorMode::Rectangle => SelectionMode::Rect,
            EditorMode::CopyRect => SelectionMode::CopyRect,
            EditorMode::Polygon => SelectionMode::Polygon,
            EditorMode::Polyline => SelectionMode::Polyline,
            EditorMode::Point => SelectionMode::Point,
            EditorMode::Select | EditorMode::None => SelectionMode::None,
        }
    }
}

/// Host-supplied inputs of the canvas.
#[derive(Debug, Clone, Default)]
pub struct CanvasProps {
    pub editor_mode: EditorMode,
    pub selection_mode: SelectionMode,
    pub project_tags: Vec<TagDefinition>,
    /// Tags currently armed in the tag panel.
    pub selected_tags: Vec<String>,
}

/// What a metadata update changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionChange {
    Added(Vec<RegionId>),
    Moved(RegionId),
    Deleted(RegionId),
    Retagged(Vec<RegionId>),
}

/// New metadata snapshot for the host to adopt and possibly persist.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataUpdate {
    pub metadata: AssetMetadata,
    pub change: RegionChange,
}
