// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region annotation canvas.
//!
//! The [`canvas`] module holds the core: a controller that keeps a drawing
//! surface, an asset's region metadata and the selection/clipboard state
//! consistent while users draw, move, tag, copy and paste regions.

pub mod canvas;
pub mod models;
pub mod util;

pub use canvas::{CanvasController, CanvasError, MetadataUpdate, RenderingSurface, SurfaceEvent};
pub use models::asset::{Asset, AssetMetadata, AssetState};
pub use models::region::{Region, RegionId, RegionType};
pub use models::tag::TagDefinition;
