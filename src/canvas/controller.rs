// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas controller.
//!
//! Applies surface interaction and host actions to the active asset's
//! regions while keeping the surface, the metadata snapshot and the
//! selection consistent. Geometry enters the surface through
//! `scale_region_to_display_size` and leaves it through
//! `scale_region_to_source_size`, so the surface's current scale is used
//! every time.

use super::clipboard::Clipboard;
use super::helpers::{build_tag_descriptor, duplicate_with_offset, to_source_region, to_surface_geometry, toggle_tag};
use super::surface::{ContentBind, ContentSource, RenderingSurface, SelectionMode, SurfaceEvent, SurfaceGeometry};
use super::{CanvasConfig, CanvasError, CanvasProps, EditorMode, MetadataUpdate, RegionChange};
use crate::models::asset::AssetMetadata;
use crate::models::region::{Region, RegionId, RegionType};
use crate::models::tag::TagDefinition;
use crate::util::geometry::{BoundingBox, Display, Size};
use std::sync::mpsc::{Receiver, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Ready,
    TornDown,
}

/// Content bind that has not reported completion yet.
struct PendingBind {
    receiver: ContentBind,
    content: ContentSource,
    /// Re-enable interaction once bound (native player released control).
    resume: bool,
}

/// Stateful core of the annotation canvas.
pub struct CanvasController<S: RenderingSurface> {
    surface: S,
    config: CanvasConfig,
    props: CanvasProps,
    lifecycle: Lifecycle,
    events: Option<Receiver<SurfaceEvent>>,
    resize_attached: bool,
    canvas_enabled: bool,
    multi_select: bool,
    selected: Vec<RegionId>,
    clipboard: Clipboard,
    /// Display size of the last drawn shape, stamped in copy-rect mode.
    template: Option<Size>,
    metadata: Option<AssetMetadata>,
    content: Option<ContentSource>,
    pending_bind: Option<PendingBind>,
}

impl<S: RenderingSurface> CanvasController<S> {
    pub fn new(surface: S, props: CanvasProps) -> Self {
        Self::with_config(surface, props, CanvasConfig::default())
    }

    pub fn with_config(surface: S, props: CanvasProps, config: CanvasConfig) -> Self {
        Self {
            surface,
            config: config.validated(),
            props,
            lifecycle: Lifecycle::Created,
            events: None,
            resize_attached: false,
            canvas_enabled: true,
            multi_select: false,
            selected: Vec::new(),
            clipboard: Clipboard::new(),
            template: None,
            metadata: None,
            content: None,
            pending_bind: None,
        }
    }

    /// Attach to the surface: open its event stream, apply the selection
    /// mode, drop stale regions and start following viewport resizes.
    /// Allowed exactly once per controller.
    pub fn initialize(&mut self) -> Result<(), CanvasError> {
        match self.lifecycle {
            Lifecycle::Ready => return Err(CanvasError::AlreadyInitialized),
            Lifecycle::TornDown => return Err(CanvasError::TornDown),
            Lifecycle::Created => {}
        }

        self.events = Some(self.surface.subscribe());
        self.surface.set_selection_mode(self.props.selection_mode, self.template);
        self.surface.delete_all_regions();
        self.resize_attached = true;
        self.lifecycle = Lifecycle::Ready;
        log::debug!("Canvas initialized in {:?} mode", self.props.selection_mode);
        Ok(())
    }

    /// Detach from the surface. Later surface events are never seen.
    pub fn teardown(&mut self) {
        self.events = None;
        self.resize_attached = false;
        self.pending_bind = None;
        self.lifecycle = Lifecycle::TornDown;
        log::debug!("Canvas torn down");
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    pub fn is_enabled(&self) -> bool {
        self.canvas_enabled
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn props(&self) -> &CanvasProps {
        &self.props
    }

    pub fn metadata(&self) -> Option<&AssetMetadata> {
        self.metadata.as_ref()
    }

    pub fn selected_region_ids(&self) -> &[RegionId] {
        &self.selected
    }

    /// Selected regions as they currently are in the metadata.
    pub fn selected_regions(&self) -> Vec<&Region> {
        let Some(metadata) = &self.metadata else {
            return Vec::new();
        };
        self.selected.iter().filter_map(|id| metadata.region(id)).collect()
    }

    pub fn has_clipboard(&self) -> bool {
        !self.clipboard.is_empty()
    }

    // ---------------------------------------------------------------------
    // Host-driven changes
    // ---------------------------------------------------------------------

    /// Swap in a different active asset.
    pub fn set_asset(&mut self, metadata: AssetMetadata) {
        self.surface.delete_all_regions();
        self.selected.clear();
        self.pending_bind = None;
        self.content = None;
        self.canvas_enabled = true;
        self.surface.set_enabled(true);
        log::info!(
            "Active asset is now {} with {} regions",
            metadata.asset.name,
            metadata.regions.len()
        );
        self.metadata = Some(metadata);
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.props.selection_mode = mode;
        self.surface.set_selection_mode(mode, self.template);
    }

    /// Change the drawing tool; the surface follows with the matching
    /// selection mode.
    pub fn set_editor_mode(&mut self, mode: EditorMode) {
        self.props.editor_mode = mode;
        self.set_selection_mode(mode.selection_mode());
    }

    /// Replace the project's tag definitions and re-render every region's
    /// tags against them.
    pub fn set_project_tags(&mut self, tags: Vec<TagDefinition>) {
        self.props.project_tags = tags;
        let Some(metadata) = &self.metadata else {
            return;
        };
        for region in &metadata.regions {
            self.surface
                .update_region_tags(&region.id, build_tag_descriptor(&self.props.project_tags, region));
        }
    }

    /// Arm a new set of tags and apply it to the current selection.
    pub fn set_selected_tags(&mut self, tags: Vec<String>) -> Vec<MetadataUpdate> {
        self.props.selected_tags = tags;
        let armed = self.props.selected_tags.clone();
        self.apply_tags_to_selection(&armed).into_iter().collect()
    }

    /// Replace the armed tags without touching the selection. Armed tags
    /// are added to every newly drawn region.
    pub fn arm_tags(&mut self, tags: Vec<String>) {
        self.props.selected_tags = tags;
    }

    /// Toggle a single tag on every selected region.
    pub fn toggle_selection_tag(&mut self, name: &str) -> Vec<MetadataUpdate> {
        self.apply_tags_to_selection(&[name.to_string()]).into_iter().collect()
    }

    pub fn set_multi_select(&mut self, enabled: bool) {
        self.multi_select = enabled;
    }

    // ---------------------------------------------------------------------
    // Content lifecycle
    // ---------------------------------------------------------------------

    /// New visual content finished loading.
    pub fn on_asset_loaded(&mut self, content: ContentSource) {
        self.bind_content(content, false);
    }

    /// A native player took over rendering.
    pub fn on_asset_activated(&mut self) {
        self.surface.delete_all_regions();
        self.canvas_enabled = false;
        self.surface.set_enabled(false);
        log::debug!("Canvas disabled while the native player is active");
    }

    /// The native player released rendering control.
    pub fn on_asset_deactivated(&mut self, content: ContentSource) {
        self.bind_content(content, true);
    }

    pub fn on_viewport_resize(&mut self, display_box: BoundingBox<Display>) {
        if !self.resize_attached {
            return;
        }
        if let Some(pending) = &mut self.pending_bind {
            pending.content.display_box = display_box;
        }
        let Some(content) = &mut self.content else {
            return;
        };
        content.display_box = display_box;
        self.surface.set_overlay(display_box);
        if self.canvas_enabled {
            self.refresh_regions();
        }
    }

    fn bind_content(&mut self, content: ContentSource, resume: bool) {
        let receiver = self.surface.add_content_source(&content);
        self.pending_bind = Some(PendingBind {
            receiver,
            content,
            resume,
        });
    }

    /// Advance pending work: finish a completed content bind, then apply
    /// every queued surface event. Call once per frame.
    pub fn poll(&mut self) -> Vec<MetadataUpdate> {
        self.poll_content_bind();
        self.process_events()
    }

    fn poll_content_bind(&mut self) {
        let Some(pending) = &self.pending_bind else {
            return;
        };
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("content source dropped before binding".to_string()),
        };
        let Some(pending) = self.pending_bind.take() else {
            return;
        };

        match result {
            Ok(()) => self.finish_bind(pending.content, pending.resume),
            Err(e) => {
                log::warn!("Failed to bind content for asset {}: {}", pending.content.asset_id, e);
                if pending.resume {
                    self.canvas_enabled = true;
                    self.surface.set_enabled(true);
                }
            }
        }
    }

    fn finish_bind(&mut self, content: ContentSource, resume: bool) {
        let is_active = self
            .metadata
            .as_ref()
            .is_some_and(|metadata| metadata.asset.id == content.asset_id);
        if !is_active {
            log::debug!("Discarding content bound for inactive asset {}", content.asset_id);
            return;
        }

        self.surface.set_overlay(content.display_box);
        self.content = Some(content);
        if resume {
            self.canvas_enabled = true;
            self.surface.set_enabled(true);
        }
        if self.canvas_enabled {
            self.refresh_regions();
        }
    }

    /// Redraw every persisted region at the current display scale.
    fn refresh_regions(&mut self) {
        self.surface.delete_all_regions();
        let Some(metadata) = &self.metadata else {
            return;
        };
        for region in &metadata.regions {
            let geometry = self.surface.scale_region_to_display_size(&to_surface_geometry(region));
            self.surface
                .add_region(&region.id, geometry, build_tag_descriptor(&self.props.project_tags, region));
        }
    }

    // ---------------------------------------------------------------------
    // Surface events
    // ---------------------------------------------------------------------

    fn process_events(&mut self) -> Vec<MetadataUpdate> {
        let Some(receiver) = &self.events else {
            return Vec::new();
        };
        let events: Vec<SurfaceEvent> = receiver.try_iter().collect();
        events.into_iter().filter_map(|event| self.handle_event(event)).collect()
    }

    fn handle_event(&mut self, event: SurfaceEvent) -> Option<MetadataUpdate> {
        if !self.canvas_enabled {
            log::debug!("Dropping {:?} while the canvas is disabled", event);
            return None;
        }
        match event {
            SurfaceEvent::SelectionEnd(geometry) => self.on_selection_end(geometry),
            SurfaceEvent::RegionMove { id, geometry } => self.on_region_move(id, geometry),
            SurfaceEvent::RegionDelete(id) => self.delete_region(&id),
            SurfaceEvent::RegionSelected(id) => {
                self.on_region_selected(id);
                None
            }
        }
    }

    fn on_selection_end(&mut self, geometry: SurfaceGeometry<Display>) -> Option<MetadataUpdate> {
        if geometry.is_empty() {
            log::debug!("Ignoring empty drawing");
            return None;
        }
        let metadata = self.metadata.as_mut()?;

        let mut id = RegionId::generate();
        while metadata.contains(&id) {
            id = RegionId::generate();
        }

        self.template = Some(geometry.bounding_box.size());
        let scaled = self.surface.scale_region_to_source_size(&geometry);
        let region_type = self
            .props
            .editor_mode
            .region_type()
            .unwrap_or_else(|| RegionType::from_shape_kind(geometry.kind));
        self.surface.add_region(&id, geometry, Default::default());

        let mut region = to_source_region(&scaled, region_type, id.clone());
        for tag in &self.props.selected_tags {
            if !region.has_tag(tag) {
                region.tags.push(tag.clone());
            }
        }
        if !region.tags.is_empty() {
            self.surface
                .update_region_tags(&id, build_tag_descriptor(&self.props.project_tags, &region));
        }

        metadata.regions.push(region);
        metadata.sync_state();
        log::info!("Added region {}, total: {}", id, metadata.regions.len());

        self.selected = vec![id.clone()];
        self.notify(RegionChange::Added(vec![id]))
    }

    fn on_region_move(&mut self, id: RegionId, geometry: SurfaceGeometry<Display>) -> Option<MetadataUpdate> {
        let scaled = self.surface.scale_region_to_source_size(&geometry);
        let metadata = self.metadata.as_mut()?;
        let Some(region) = metadata.region_mut(&id) else {
            log::debug!("Ignoring move of unknown region {}", id);
            return None;
        };
        region.bounding_box = scaled.bounding_box;
        region.points = scaled.points;

        self.selected = vec![id.clone()];
        self.notify(RegionChange::Moved(id))
    }

    fn on_region_selected(&mut self, id: RegionId) {
        let known = self.metadata.as_ref().is_some_and(|metadata| metadata.contains(&id));
        if !known {
            log::debug!("Ignoring selection of unknown region {}", id);
            return;
        }
        if !self.multi_select {
            self.selected = vec![id];
        } else if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    fn delete_region(&mut self, id: &RegionId) -> Option<MetadataUpdate> {
        self.surface.delete_region(id);
        let metadata = self.metadata.as_mut()?;
        if metadata.remove_region(id).is_none() {
            log::debug!("Ignoring delete of unknown region {}", id);
            return None;
        }
        metadata.sync_state();
        log::info!("Deleted region {}, total: {}", id, metadata.regions.len());

        self.selected.clear();
        self.notify(RegionChange::Deleted(id.clone()))
    }

    // ---------------------------------------------------------------------
    // Editing actions
    // ---------------------------------------------------------------------

    /// Put a snapshot of the selection on the clipboard.
    pub fn copy_regions(&mut self) {
        let regions: Vec<Region> = self.selected_regions().into_iter().cloned().collect();
        if regions.is_empty() {
            return;
        }
        self.clipboard.set(&regions);
        log::info!("Copied {} regions", regions.len());
    }

    /// Copy the selection, then delete each selected region.
    pub fn cut_regions(&mut self) -> Vec<MetadataUpdate> {
        self.copy_regions();
        self.remove_selected_regions()
    }

    /// Add shifted copies of the clipboard contents to the active asset.
    pub fn paste_regions(&mut self) -> Vec<MetadataUpdate> {
        if !self.canvas_enabled {
            log::debug!("Ignoring paste while the canvas is disabled");
            return Vec::new();
        }
        let Some(regions) = self.clipboard.get() else {
            return Vec::new();
        };
        let Some(metadata) = self.metadata.as_mut() else {
            return Vec::new();
        };
        if regions.is_empty() {
            return Vec::new();
        }

        let duplicates = duplicate_with_offset(
            &regions,
            &metadata.regions,
            self.config.paste_margin,
            metadata.asset.size,
        );
        for region in &duplicates {
            let geometry = self.surface.scale_region_to_display_size(&to_surface_geometry(region));
            self.surface
                .add_region(&region.id, geometry, build_tag_descriptor(&self.props.project_tags, region));
        }

        let ids: Vec<RegionId> = duplicates.iter().map(|region| region.id.clone()).collect();
        metadata.regions.extend(duplicates);
        metadata.sync_state();
        log::info!("Pasted {} regions, total: {}", ids.len(), metadata.regions.len());

        self.notify(RegionChange::Added(ids)).into_iter().collect()
    }

    /// Select every region of the asset and apply the armed tags to them.
    pub fn select_all_regions(&mut self) -> Vec<MetadataUpdate> {
        let Some(metadata) = &self.metadata else {
            return Vec::new();
        };
        self.selected = metadata.regions.iter().map(|region| region.id.clone()).collect();
        let armed = self.props.selected_tags.clone();
        self.apply_tags_to_selection(&armed).into_iter().collect()
    }

    /// Delete every selected region.
    pub fn remove_selected_regions(&mut self) -> Vec<MetadataUpdate> {
        let ids = self.selected.clone();
        ids.iter().filter_map(|id| self.delete_region(id)).collect()
    }

    /// Delete every region of the asset.
    pub fn clear_all_regions(&mut self) -> Vec<MetadataUpdate> {
        let ids: Vec<RegionId> = match &self.metadata {
            Some(metadata) => metadata.regions.iter().map(|region| region.id.clone()).collect(),
            None => return Vec::new(),
        };
        ids.iter().filter_map(|id| self.delete_region(id)).collect()
    }

    /// Clear the selection's tags when `tags` is empty, otherwise toggle
    /// each of `tags` on every selected region.
    fn apply_tags_to_selection(&mut self, tags: &[String]) -> Option<MetadataUpdate> {
        let metadata = self.metadata.as_mut()?;
        let mut changed = Vec::new();
        for id in &self.selected {
            let Some(region) = metadata.region_mut(id) else {
                continue;
            };
            if tags.is_empty() {
                region.tags.clear();
            } else {
                for tag in tags {
                    toggle_tag(&mut region.tags, tag);
                }
            }
            self.surface
                .update_region_tags(id, build_tag_descriptor(&self.props.project_tags, region));
            changed.push(id.clone());
        }

        if changed.is_empty() {
            return None;
        }
        self.notify(RegionChange::Retagged(changed))
    }

    fn notify(&self, change: RegionChange) -> Option<MetadataUpdate> {
        let metadata = self.metadata.as_ref()?;
        log::debug!("Asset {} changed: {:?}", metadata.asset.id, change);
        Some(MetadataUpdate {
            metadata: metadata.clone(),
            change,
        })
    }
}
