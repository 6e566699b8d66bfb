// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data structures.
//!
//! A region is a tagged shape over an asset. Its geometry is always stored
//! in the source pixel space of the asset, never in display space.

use crate::util::geometry::{BoundingBox, Point, Source};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a region within an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionType {
    Rectangle,
    Polygon,
    Point,
    Polyline,
}

/// A tagged region in source coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    pub bounding_box: BoundingBox<Source>,
    pub points: Vec<Point<Source>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Region {
    /// Create an untagged region.
    pub fn new(
        id: RegionId,
        region_type: RegionType,
        bounding_box: BoundingBox<Source>,
        points: Vec<Point<Source>>,
    ) -> Self {
        Self {
            id,
            region_type,
            bounding_box,
            points,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RegionId::generate(), RegionId::generate());
    }

    #[test]
    fn test_region_json_layout() {
        let mut region = Region::new(
            RegionId::from("r1"),
            RegionType::Rectangle,
            BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            vec![Point::new(1.0, 2.0)],
        );
        region.tags.push("cat".to_string());

        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["id"], "r1");
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["boundingBox"]["left"], 1.0);
        assert_eq!(value["tags"][0], "cat");

        let parsed: Region = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, region);
    }
}
