// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Asset metadata serialization and deserialization.
//!
//! The host decides when to persist; this module exports and imports
//! asset metadata in YAML and JSON formats.

use anyhow::{bail, Result};
use std::path::Path;
use tagcanvas::AssetMetadata;

/// Export asset metadata, choosing the format from the file extension.
pub fn export(data: &AssetMetadata, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        extension => bail!("Unsupported file extension: {:?}", extension),
    }
}

/// Import asset metadata, choosing the format from the file extension.
pub fn import(path: &Path) -> Result<AssetMetadata> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        extension => bail!("Unsupported file extension: {:?}", extension),
    }
}

fn export_yaml(data: &AssetMetadata, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

fn export_json(data: &AssetMetadata, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn import_yaml(path: &Path) -> Result<AssetMetadata> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

fn import_json(path: &Path) -> Result<AssetMetadata> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagcanvas::util::geometry::{BoundingBox, Point, Size};
    use tagcanvas::{Asset, Region, RegionId, RegionType};

    fn sample() -> AssetMetadata {
        let mut metadata = AssetMetadata::new(Asset::new(
            "frame.png".into(),
            "/data/frame.png".into(),
            Some(Size::new(640.0, 480.0)),
        ));
        let mut region = Region::new(
            RegionId::from("r1"),
            RegionType::Polygon,
            BoundingBox::new(1.0, 2.0, 10.0, 10.0),
            vec![Point::new(1.0, 2.0), Point::new(11.0, 2.0), Point::new(6.0, 12.0)],
        );
        region.tags.push("cat".into());
        metadata.regions.push(region);
        metadata.sync_state();
        metadata
    }

    #[test]
    fn test_yaml_and_json_exports_read_back() {
        let dir = std::env::temp_dir().join(format!("tagcanvas-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let data = sample();

        for name in ["asset.yaml", "asset.json"] {
            let path = dir.join(name);
            export(&data, &path).unwrap();
            assert_eq!(import(&path).unwrap(), data);
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        assert!(export(&sample(), Path::new("asset.txt")).is_err());
        assert!(import(Path::new("asset")).is_err());
    }
}
