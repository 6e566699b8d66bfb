// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading for the host window.
//!
//! Decodes an image file into RGBA pixels ready to upload as an egui
//! texture.

use anyhow::{Context, Result};
use std::path::Path;

/// Decoded image pixels.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load and decode an image file as RGBA8.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}
