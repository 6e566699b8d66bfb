// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project-level tag definitions.

use serde::{Deserialize, Serialize};

/// A tag defined at project level, with the color used to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub name: String,
    /// Hex color, `#rrggbb`.
    pub color: String,
}

impl TagDefinition {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}
