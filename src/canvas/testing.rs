// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory rendering surface for controller tests.

use super::surface::{
    ContentBind, ContentSource, RenderingSurface, SelectionMode, SurfaceEvent, SurfaceGeometry, TagDescriptor,
};
use crate::models::region::RegionId;
use crate::util::geometry::{BoundingBox, Display, Scale, Size, Source};
use std::sync::mpsc::{channel, Sender};

/// How the fake answers `add_content_source`.
#[derive(Debug, Clone, PartialEq)]
pub enum BindBehavior {
    Succeed,
    Fail(String),
    /// Keep the bind pending until the test completes it.
    Hold,
}

/// Surface that records what the controller asks of it.
pub struct FakeSurface {
    events: Option<Sender<SurfaceEvent>>,
    pub regions: Vec<(RegionId, SurfaceGeometry<Display>, TagDescriptor)>,
    pub mode: Option<(SelectionMode, Option<Size>)>,
    pub overlay: Option<BoundingBox<Display>>,
    pub enabled: bool,
    pub scale: Scale,
    pub native_size: Option<Size>,
    pub bind_behavior: BindBehavior,
    pub held_binds: Vec<Sender<Result<(), String>>>,
    pub subscriptions: usize,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::with_scale(Scale::IDENTITY)
    }

    pub fn with_scale(scale: Scale) -> Self {
        Self {
            events: None,
            regions: Vec::new(),
            mode: None,
            overlay: None,
            enabled: true,
            scale,
            native_size: None,
            bind_behavior: BindBehavior::Succeed,
            held_binds: Vec::new(),
            subscriptions: 0,
        }
    }

    /// Deliver an event as if the user had interacted with the surface.
    pub fn emit(&self, event: SurfaceEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }

    pub fn region(&self, id: &RegionId) -> Option<&(RegionId, SurfaceGeometry<Display>, TagDescriptor)> {
        self.regions.iter().find(|(region_id, _, _)| region_id == id)
    }

    pub fn has_region(&self, id: &RegionId) -> bool {
        self.region(id).is_some()
    }
}

impl RenderingSurface for FakeSurface {
    fn subscribe(&mut self) -> std::sync::mpsc::Receiver<SurfaceEvent> {
        let (sender, receiver) = channel();
        self.events = Some(sender);
        self.subscriptions += 1;
        receiver
    }

    fn set_selection_mode(&mut self, mode: SelectionMode, template: Option<Size>) {
        self.mode = Some((mode, template));
    }

    fn add_content_source(&mut self, content: &ContentSource) -> ContentBind {
        let (sender, receiver) = channel();
        self.native_size = Some(content.native_size);
        match &self.bind_behavior {
            BindBehavior::Succeed => {
                let _ = sender.send(Ok(()));
            }
            BindBehavior::Fail(reason) => {
                let _ = sender.send(Err(reason.clone()));
            }
            BindBehavior::Hold => self.held_binds.push(sender),
        }
        receiver
    }

    fn set_overlay(&mut self, bounds: BoundingBox<Display>) {
        self.overlay = Some(bounds);
        if let Some(native) = self.native_size {
            self.scale = Scale::between(native, bounds.size());
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn add_region(&mut self, id: &RegionId, geometry: SurfaceGeometry<Display>, tags: TagDescriptor) {
        self.regions.push((id.clone(), geometry, tags));
    }

    fn delete_region(&mut self, id: &RegionId) {
        self.regions.retain(|(region_id, _, _)| region_id != id);
    }

    fn delete_all_regions(&mut self) {
        self.regions.clear();
    }

    fn update_region_tags(&mut self, id: &RegionId, tags: TagDescriptor) {
        if let Some(entry) = self.regions.iter_mut().find(|(region_id, _, _)| region_id == id) {
            entry.2 = tags;
        }
    }

    fn scale_region_to_source_size(&self, geometry: &SurfaceGeometry<Display>) -> SurfaceGeometry<Source> {
        geometry.to_source(&self.scale)
    }

    fn scale_region_to_display_size(&self, geometry: &SurfaceGeometry<Source>) -> SurfaceGeometry<Display> {
        geometry.to_display(&self.scale)
    }
}
