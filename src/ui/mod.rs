// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the tagging window.

pub mod surface;
pub mod tags;
pub mod toolbar;
