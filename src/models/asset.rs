// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Asset metadata.
//!
//! One visual asset (image or video frame) together with the regions drawn
//! on it. The host owns the persisted copy; the canvas works on a snapshot
//! and hands back updated snapshots.

use super::region::{Region, RegionId};
use crate::util::geometry::Size;
use serde::{Deserialize, Serialize};

/// Annotation progress of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetState {
    #[default]
    NotVisited,
    Visited,
    Tagged,
}

/// Kind of visual content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Image,
    Video,
    VideoFrame,
}

/// Identity of a visual asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub asset_type: AssetType,
    /// Native pixel size, once known.
    pub size: Option<Size>,
    #[serde(default)]
    pub state: AssetState,
}

impl Asset {
    /// Create an unvisited image asset for the given path.
    pub fn new(name: String, path: String, size: Option<Size>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            path,
            asset_type: AssetType::Image,
            size,
            state: AssetState::NotVisited,
        }
    }
}

/// An asset and its regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub asset: Asset,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl AssetMetadata {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            regions: Vec::new(),
        }
    }

    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| &region.id == id)
    }

    pub fn region_mut(&mut self, id: &RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|region| &region.id == id)
    }

    pub fn contains(&self, id: &RegionId) -> bool {
        self.region(id).is_some()
    }

    /// Remove the region with `id`, returning it if it was present.
    pub fn remove_region(&mut self, id: &RegionId) -> Option<Region> {
        let index = self.regions.iter().position(|region| &region.id == id)?;
        Some(self.regions.remove(index))
    }

    /// Bring the asset state in line with the region collection:
    /// Tagged while any region exists, back to Visited once it empties.
    pub fn sync_state(&mut self) {
        if !self.regions.is_empty() {
            self.asset.state = AssetState::Tagged;
        } else if self.asset.state == AssetState::Tagged {
            self.asset.state = AssetState::Visited;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::RegionType;
    use crate::util::geometry::BoundingBox;

    fn region(id: &str) -> Region {
        Region::new(RegionId::from(id), RegionType::Point, BoundingBox::new(0.0, 0.0, 0.0, 0.0), Vec::new())
    }

    #[test]
    fn test_state_follows_region_collection() {
        let mut metadata = AssetMetadata::new(Asset::new("a.png".into(), "/tmp/a.png".into(), None));
        metadata.sync_state();
        assert_eq!(metadata.asset.state, AssetState::NotVisited);

        metadata.regions.push(region("r1"));
        metadata.sync_state();
        assert_eq!(metadata.asset.state, AssetState::Tagged);

        metadata.remove_region(&RegionId::from("r1"));
        metadata.sync_state();
        assert_eq!(metadata.asset.state, AssetState::Visited);
    }

    #[test]
    fn test_remove_missing_region_is_noop() {
        let mut metadata = AssetMetadata::new(Asset::new("a.png".into(), "/tmp/a.png".into(), None));
        metadata.regions.push(region("r1"));

        assert!(metadata.remove_region(&RegionId::from("nope")).is_none());
        assert_eq!(metadata.regions.len(), 1);
    }
}
