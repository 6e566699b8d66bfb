// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data model: regions, assets and project tags.

pub mod asset;
pub mod region;
pub mod tag;
