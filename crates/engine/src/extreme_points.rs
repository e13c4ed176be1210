//! Extreme Point management for the placement engine.
//!
//! Extreme Points are candidate placement coordinates generated at the
//! exposed corners of already-placed items. Points are never removed from
//! the set, only flagged as used; insertion deduplicates within the shared
//! geometric tolerance, so the final set is independent of insertion order
//! for a given set of placements.
//!
//! # References
//!
//! - Crainic, T. G., Perboli, G., & Tadei, R. (2008). Extreme point-based
//!   heuristics for three-dimensional bin packing.

use crate::item::Item;
use palletize_core::EPSILON;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A candidate placement coordinate in pallet space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtremePoint {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
    /// Whether an item has been placed at this point.
    pub used: bool,
}

impl ExtremePoint {
    /// Creates a new unused extreme point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            used: false,
        }
    }

    /// Placement priority: bottom first, then closer to the origin.
    /// Lower is better.
    pub fn priority(&self) -> f64 {
        1000.0 * self.z + (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns true if another point coincides within tolerance on all axes.
    pub fn coincides(&self, x: f64, y: f64, z: f64) -> bool {
        (self.x - x).abs() < EPSILON && (self.y - y).abs() < EPSILON && (self.z - z).abs() < EPSILON
    }
}

/// The extreme-point set of one pallet.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtremePointSet {
    points: Vec<ExtremePoint>,
    length: f64,
    width: f64,
    max_height: f64,
}

impl ExtremePointSet {
    /// Creates the set for an empty pallet, seeded with the origin.
    pub fn new(length: f64, width: f64, max_height: f64) -> Self {
        let mut set = Self {
            points: Vec::new(),
            length,
            width,
            max_height,
        };
        set.insert(0.0, 0.0, 0.0);
        set
    }

    /// Creates the set for a pallet that already carries items: the top-face
    /// vertices of every placed item become candidate points.
    pub fn from_items(length: f64, width: f64, max_height: f64, items: &[Item]) -> Self {
        let mut set = Self::new(length, width, max_height);
        for item in items {
            let x0 = item.position.x;
            let y0 = item.position.y;
            let x1 = x0 + item.current_length();
            let y1 = y0 + item.current_width();
            let top = item.top_z();

            set.insert(x0, y0, top);
            set.insert(x1, y0, top);
            set.insert(x0, y1, top);
            set.insert(x1, y1, top);
        }
        set.sort_by_priority();
        set
    }

    /// Number of points, used ones included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the points in their current order.
    pub fn points(&self) -> &[ExtremePoint] {
        &self.points
    }

    /// Inserts a candidate point.
    ///
    /// Rejects duplicates (all axes within tolerance of an existing point)
    /// and points outside the pallet box. Returns true if the point was
    /// added, so inserting the same point twice is a no-op.
    pub fn insert(&mut self, x: f64, y: f64, z: f64) -> bool {
        if self.points.iter().any(|p| p.coincides(x, y, z)) {
            return false;
        }
        if x < -EPSILON
            || y < -EPSILON
            || z < -EPSILON
            || x > self.length + EPSILON
            || y > self.width + EPSILON
            || z > self.max_height + EPSILON
        {
            return false;
        }

        self.points.push(ExtremePoint::new(x, y, z));
        true
    }

    /// Stable sort by ascending priority; ties keep insertion order.
    pub fn sort_by_priority(&mut self) {
        self.points.sort_by(|a, b| {
            a.priority()
                .partial_cmp(&b.priority())
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Flags the point at `index` as used. Used points are skipped during
    /// iteration but never removed.
    pub fn mark_used(&mut self, index: usize) {
        self.points[index].used = true;
    }

    /// Registers a committed placement: inserts the three points derived
    /// from the placed item and restores the priority order.
    pub fn register_placement(&mut self, item: &Item) {
        let x = item.position.x;
        let y = item.position.y;
        let z = item.position.z;

        self.insert(x + item.current_length(), y, z);
        self.insert(x, y + item.current_width(), z);
        self.insert(x, y, z + item.current_height());
        self.sort_by_priority();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_new_set_is_seeded_with_origin() {
        let set = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        assert_eq!(set.len(), 1);
        assert!(set.points()[0].coincides(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        assert!(set.insert(100.0, 0.0, 0.0));
        assert!(!set.insert(100.0, 0.0, 0.0));
        assert!(!set.insert(100.0 + EPSILON / 2.0, 0.0, 0.0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_rejects_out_of_bounds() {
        let mut set = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        assert!(!set.insert(1300.0, 0.0, 0.0));
        assert!(!set.insert(0.0, -5.0, 0.0));
        assert!(!set.insert(0.0, 0.0, 1500.0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_priority_orders_bottom_first() {
        let low_far = ExtremePoint::new(500.0, 300.0, 0.0);
        let high_near = ExtremePoint::new(0.0, 0.0, 150.0);
        assert!(low_far.priority() < high_near.priority());
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut set = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        // Same priority (symmetric coordinates), different identity.
        set.insert(300.0, 400.0, 0.0);
        set.insert(400.0, 300.0, 0.0);
        set.sort_by_priority();

        let points = set.points();
        assert_relative_eq!(points[1].x, 300.0);
        assert_relative_eq!(points[2].x, 400.0);
    }

    #[test]
    fn test_register_placement_derives_three_points() {
        let mut set = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        let mut item = Item::new("P1", 1, 100.0, 80.0, 150.0, 1.0);
        item.place_at(Point3::origin(), false);

        set.mark_used(0);
        set.register_placement(&item);

        assert_eq!(set.len(), 4);
        assert!(set.points().iter().any(|p| p.coincides(100.0, 0.0, 0.0)));
        assert!(set.points().iter().any(|p| p.coincides(0.0, 80.0, 0.0)));
        assert!(set.points().iter().any(|p| p.coincides(0.0, 0.0, 150.0)));
    }

    #[test]
    fn test_final_set_independent_of_insertion_order() {
        let mut a = ExtremePointSet::new(1200.0, 800.0, 1400.0);
        let mut b = ExtremePointSet::new(1200.0, 800.0, 1400.0);

        let coords = [(100.0, 0.0, 0.0), (0.0, 80.0, 0.0), (0.0, 0.0, 150.0)];
        for &(x, y, z) in &coords {
            a.insert(x, y, z);
        }
        for &(x, y, z) in coords.iter().rev() {
            b.insert(x, y, z);
        }
        a.sort_by_priority();
        b.sort_by_priority();

        let positions =
            |s: &ExtremePointSet| s.points().iter().map(|p| (p.x, p.y, p.z)).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
    }
}
