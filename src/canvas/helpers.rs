// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Conversions between regions and surface geometry, tag handling and the
//! duplicate-and-shift step used by paste.

use super::surface::{ShapeKind, SurfaceGeometry, TagChip, TagDescriptor};
use crate::models::region::{Region, RegionId, RegionType};
use crate::models::tag::TagDefinition;
use crate::util::geometry::{Size, Source};
use std::collections::HashSet;

/// Default shift applied to pasted regions, in source pixels.
pub const PASTE_MARGIN: f64 = 10.0;

/// Smallest usable paste margin: one source pixel.
pub const MIN_PASTE_MARGIN: f64 = 1.0;

/// Geometry of `region` for the surface, still in source space.
pub fn to_surface_geometry(region: &Region) -> SurfaceGeometry<Source> {
    SurfaceGeometry::new(
        ShapeKind::from_region_type(region.region_type),
        region.bounding_box,
        region.points.clone(),
    )
}

/// Untagged region built from geometry already scaled into source space.
pub fn to_source_region(geometry: &SurfaceGeometry<Source>, region_type: RegionType, id: RegionId) -> Region {
    Region::new(id, region_type, geometry.bounding_box, geometry.points.clone())
}

/// Remove `name` if present, otherwise append it.
pub fn toggle_tag(tags: &mut Vec<String>, name: &str) {
    match tags.iter().position(|tag| tag == name) {
        Some(index) => {
            tags.remove(index);
        }
        None => tags.push(name.to_string()),
    }
}

/// Resolve the region's tag names against the project's definitions.
/// Names without a definition are dropped.
pub fn build_tag_descriptor(project_tags: &[TagDefinition], region: &Region) -> TagDescriptor {
    let chips = region
        .tags
        .iter()
        .filter_map(|name| {
            project_tags.iter().find(|tag| &tag.name == name).map(|tag| TagChip {
                name: tag.name.clone(),
                color: tag.color.clone(),
            })
        })
        .collect();
    TagDescriptor { chips }
}

/// Copy `regions` with fresh ids, shifted so they do not land on top of an
/// existing region.
///
/// Each copy is moved by `offset` on both axes, and again by `offset` while
/// some region in `existing` (or an earlier copy) still starts at the same
/// top-left corner. If the probe runs past `bounds` it restarts once from
/// the origin.
pub fn duplicate_with_offset(
    regions: &[Region],
    existing: &[Region],
    offset: f64,
    bounds: Option<Size>,
) -> Vec<Region> {
    let mut taken: HashSet<RegionId> = existing.iter().map(|region| region.id.clone()).collect();
    let mut occupied: Vec<(f64, f64)> = existing
        .iter()
        .map(|region| (region.bounding_box.left, region.bounding_box.top))
        .collect();

    let mut duplicates = Vec::with_capacity(regions.len());
    for region in regions {
        let (dx, dy) = shift_for(region, &occupied, offset, bounds);

        let mut id = RegionId::generate();
        while taken.contains(&id) {
            id = RegionId::generate();
        }
        taken.insert(id.clone());

        let duplicate = Region {
            id,
            region_type: region.region_type,
            bounding_box: region.bounding_box.offset(dx, dy),
            points: region.points.iter().map(|p| p.offset(dx, dy)).collect(),
            tags: region.tags.clone(),
        };
        occupied.push((duplicate.bounding_box.left, duplicate.bounding_box.top));
        duplicates.push(duplicate);
    }
    duplicates
}

fn shift_for(region: &Region, occupied: &[(f64, f64)], offset: f64, bounds: Option<Size>) -> (f64, f64) {
    let origin = (region.bounding_box.left, region.bounding_box.top);
    let is_occupied = |dx: f64, dy: f64| {
        let (x, y) = (origin.0 + dx, origin.1 + dy);
        occupied
            .iter()
            .any(|&(ox, oy)| (ox - x).abs() < f64::EPSILON && (oy - y).abs() < f64::EPSILON)
    };

    let (mut dx, mut dy) = (offset, offset);
    let mut wrapped = false;
    while is_occupied(dx, dy) {
        let (next_dx, next_dy) = (dx + offset, dy + offset);
        if origin.0 + next_dx == origin.0 + dx && origin.1 + next_dy == origin.1 + dy {
            // The step no longer moves the corner at this magnitude.
            break;
        }
        dx = next_dx;
        dy = next_dy;
        if let Some(size) = bounds {
            if origin.0 + dx > size.width || origin.1 + dy > size.height {
                if wrapped {
                    break;
                }
                wrapped = true;
                dx = -origin.0;
                dy = -origin.1;
            }
        }
    }
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::{BoundingBox, Point};

    fn rect_region(id: &str, left: f64, top: f64) -> Region {
        let geometry = SurfaceGeometry::<Source>::rect(BoundingBox::new(left, top, 20.0, 20.0));
        to_source_region(&geometry, RegionType::Rectangle, RegionId::from(id))
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_surface_geometry_preserves_point_order() {
        let region = Region::new(
            RegionId::from("p"),
            RegionType::Polyline,
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            vec![Point::new(10.0, 0.0), Point::new(0.0, 10.0), Point::new(5.0, 5.0)],
        );
        let geometry = to_surface_geometry(&region);

        assert_eq!(geometry.kind, ShapeKind::Polyline);
        assert_eq!(geometry.points, region.points);

        let back = to_source_region(&geometry, RegionType::Polyline, RegionId::from("q"));
        assert_eq!(back.points, region.points);
        assert!(back.tags.is_empty());
    }

    #[test]
    fn test_toggle_tag_twice_restores_tags() {
        let mut region_tags = tags(&["dog", "cat"]);
        toggle_tag(&mut region_tags, "bird");
        assert_eq!(region_tags, tags(&["dog", "cat", "bird"]));
        toggle_tag(&mut region_tags, "bird");
        assert_eq!(region_tags, tags(&["dog", "cat"]));

        toggle_tag(&mut region_tags, "dog");
        assert_eq!(region_tags, tags(&["cat"]));
    }

    #[test]
    fn test_toggle_tag_on_empty_pushes() {
        let mut region_tags = Vec::new();
        toggle_tag(&mut region_tags, "cat");
        assert_eq!(region_tags, tags(&["cat"]));
    }

    #[test]
    fn test_descriptor_drops_undefined_tags() {
        let project_tags = vec![TagDefinition::new("cat", "#ff0000"), TagDefinition::new("dog", "#00ff00")];
        let mut region = rect_region("a", 0.0, 0.0);
        region.tags = tags(&["dog", "deleted", "cat"]);

        let descriptor = build_tag_descriptor(&project_tags, &region);
        let names: Vec<&str> = descriptor.chips.iter().map(|chip| chip.name.as_str()).collect();
        assert_eq!(names, vec!["dog", "cat"]);
        assert_eq!(descriptor.primary().map(|chip| chip.color.as_str()), Some("#00ff00"));
    }

    #[test]
    fn test_descriptor_for_untagged_region_is_empty() {
        let descriptor = build_tag_descriptor(&[TagDefinition::new("cat", "#ff0000")], &rect_region("a", 0.0, 0.0));
        assert!(descriptor.is_empty());
    }

    #[test]
    fn test_duplicate_shifts_by_margin_with_fresh_id() {
        let mut source = rect_region("a", 30.0, 40.0);
        source.tags = tags(&["cat"]);
        let existing = vec![source.clone()];

        let pasted = duplicate_with_offset(&[source.clone()], &existing, PASTE_MARGIN, None);

        assert_eq!(pasted.len(), 1);
        let copy = &pasted[0];
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.bounding_box.left, 40.0);
        assert_eq!(copy.bounding_box.top, 50.0);
        assert_eq!(copy.bounding_box.width, source.bounding_box.width);
        assert_eq!(copy.points[0], Point::new(40.0, 50.0));
        assert_eq!(copy.tags, source.tags);
    }

    #[test]
    fn test_duplicate_steps_past_earlier_pastes() {
        let source = rect_region("a", 0.0, 0.0);
        let existing = vec![source.clone(), rect_region("b", 10.0, 10.0)];

        let pasted = duplicate_with_offset(&[source], &existing, PASTE_MARGIN, None);
        assert_eq!(pasted[0].bounding_box.top_left(), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_duplicate_wraps_to_origin_outside_bounds() {
        let source = rect_region("a", 95.0, 95.0);
        let existing = vec![source.clone(), rect_region("b", 105.0, 105.0)];

        let pasted = duplicate_with_offset(&[source], &existing, PASTE_MARGIN, Some(Size::new(110.0, 110.0)));
        assert_eq!(pasted[0].bounding_box.top_left(), Point::new(0.0, 0.0));
        assert_eq!(pasted[0].points[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_duplicate_ids_never_collide() {
        let existing: Vec<Region> = (0..20).map(|i| rect_region(&format!("r{i}"), i as f64, 0.0)).collect();
        let pasted = duplicate_with_offset(&existing, &existing, PASTE_MARGIN, None);

        let mut ids: HashSet<RegionId> = existing.iter().map(|r| r.id.clone()).collect();
        for region in &pasted {
            assert!(ids.insert(region.id.clone()));
        }
    }

    #[test]
    fn test_duplicate_terminates_when_step_is_below_precision() {
        let source = rect_region("a", 1e20, 1e20);
        let existing = vec![source.clone()];

        let pasted = duplicate_with_offset(&[source], &existing, MIN_PASTE_MARGIN, None);
        assert_eq!(pasted.len(), 1);
    }
}
