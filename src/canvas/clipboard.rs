// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Single-slot region clipboard.
//!
//! Regions are cloned on the way in and on the way out, so nothing done to
//! the live regions after a copy, or to a pasted batch, reaches the stored
//! snapshot.

use crate::models::region::Region;

#[derive(Debug, Default)]
pub struct Clipboard {
    snapshot: Option<Vec<Region>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored snapshot.
    pub fn set(&mut self, regions: &[Region]) {
        self.snapshot = Some(regions.to_vec());
    }

    /// Last stored snapshot, if any. Reading does not clear it.
    pub fn get(&self) -> Option<Vec<Region>> {
        self.snapshot.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::{RegionId, RegionType};
    use crate::util::geometry::{BoundingBox, Point};

    fn region(id: &str) -> Region {
        Region::new(
            RegionId::from(id),
            RegionType::Point,
            BoundingBox::new(1.0, 1.0, 0.0, 0.0),
            vec![Point::new(1.0, 1.0)],
        )
    }

    #[test]
    fn test_empty_clipboard_returns_none() {
        assert!(Clipboard::new().get().is_none());
    }

    #[test]
    fn test_snapshot_is_isolated_from_live_regions() {
        let mut clipboard = Clipboard::new();
        let mut live = vec![region("a")];
        clipboard.set(&live);

        live[0].tags.push("cat".into());
        live[0].points[0] = Point::new(99.0, 99.0);

        let mut stored = clipboard.get().unwrap();
        assert!(stored[0].tags.is_empty());
        assert_eq!(stored[0].points[0], Point::new(1.0, 1.0));

        stored[0].tags.push("dog".into());
        assert!(clipboard.get().unwrap()[0].tags.is_empty());
    }

    #[test]
    fn test_read_does_not_clear_and_last_write_wins() {
        let mut clipboard = Clipboard::new();
        clipboard.set(&[region("a")]);
        clipboard.set(&[region("b"), region("c")]);

        assert_eq!(clipboard.get().unwrap().len(), 2);
        assert_eq!(clipboard.get().unwrap()[0].id, RegionId::from("b"));
    }

    #[test]
    fn test_coordinates_are_kept_bit_for_bit() {
        let mut awkward = region("a");
        awkward.bounding_box = BoundingBox::new(3.9983291457022068, f64::NAN, 0.1 + 0.2, 1e-300);
        let mut clipboard = Clipboard::new();
        clipboard.set(&[awkward.clone()]);

        let stored = clipboard.get().unwrap();
        assert_eq!(stored[0].bounding_box.left.to_bits(), awkward.bounding_box.left.to_bits());
        assert!(stored[0].bounding_box.top.is_nan());
        assert_eq!(stored[0].bounding_box.width.to_bits(), awkward.bounding_box.width.to_bits());
        assert_eq!(stored[0].bounding_box.height.to_bits(), awkward.bounding_box.height.to_bits());
    }
}
