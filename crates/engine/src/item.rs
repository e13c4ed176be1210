//! Item representation: a rectangular box with product identity and
//! placement state.

use nalgebra::{Point3, Vector3};
use palletize_core::{Aabb, Error, Result, EPSILON};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inset applied to an item's base corners when counting supported
/// vertices, in millimetres toward the footprint centroid.
pub const CORNER_INSET: f64 = 10.0;

/// A single box of an order.
///
/// Identity (`product_id`, `item_id`, nominal extents, weight) is fixed at
/// construction; the placement state (`position`, `rotated`) is mutated by
/// the placement engine. Items are cloned into scratch pallets during
/// search, so an item instance belongs to exactly one pallet at a time.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Product identity.
    pub product_id: String,
    /// Item id, unique within an order.
    pub item_id: usize,
    /// Nominal length in mm (X before rotation).
    pub length: f64,
    /// Nominal width in mm (Y before rotation).
    pub width: f64,
    /// Height in mm.
    pub height: f64,
    /// Weight in kg.
    pub weight: f64,
    /// Minimum-corner position in pallet coordinates.
    pub position: Point3<f64>,
    /// Whether the item is rotated 90° about the vertical axis.
    pub rotated: bool,
}

impl Item {
    /// Creates a new unplaced item at the origin.
    pub fn new(
        product_id: impl Into<String>,
        item_id: usize,
        length: f64,
        width: f64,
        height: f64,
        weight: f64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            item_id,
            length,
            width,
            height,
            weight,
            position: Point3::origin(),
            rotated: false,
        }
    }

    /// Validates the nominal extents and weight.
    pub fn validate(&self) -> Result<()> {
        if self.length <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidItem(format!(
                "item {} of product {} has non-positive extents",
                self.item_id, self.product_id
            )));
        }
        if self.weight <= 0.0 {
            return Err(Error::InvalidItem(format!(
                "item {} of product {} has non-positive weight",
                self.item_id, self.product_id
            )));
        }
        Ok(())
    }

    /// Current X extent, accounting for rotation.
    pub fn current_length(&self) -> f64 {
        if self.rotated {
            self.width
        } else {
            self.length
        }
    }

    /// Current Y extent, accounting for rotation.
    pub fn current_width(&self) -> f64 {
        if self.rotated {
            self.length
        } else {
            self.width
        }
    }

    /// Current Z extent.
    pub fn current_height(&self) -> f64 {
        self.height
    }

    /// Volume in mm³.
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Current footprint area in mm².
    pub fn base_area(&self) -> f64 {
        self.current_length() * self.current_width()
    }

    /// Total surface area in mm².
    pub fn surface_area(&self) -> f64 {
        let (l, w, h) = (self.current_length(), self.current_width(), self.height);
        2.0 * (l * w + l * h + w * h)
    }

    /// Moves the item to `position` with the given orientation.
    pub fn place_at(&mut self, position: Point3<f64>, rotated: bool) {
        self.position = position;
        self.rotated = rotated;
    }

    /// Axis-aligned bounding box at the current placement.
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.position,
            Vector3::new(self.current_length(), self.current_width(), self.height),
        )
    }

    /// Z coordinate of the top face.
    pub fn top_z(&self) -> f64 {
        self.position.z + self.height
    }

    /// Returns true if the item rests on the pallet floor.
    pub fn on_floor(&self) -> bool {
        self.position.z.abs() <= EPSILON
    }

    /// The four base corners, each inset toward the footprint centroid.
    pub fn inset_base_corners(&self, inset: f64) -> [(f64, f64); 4] {
        let x0 = self.position.x;
        let y0 = self.position.y;
        let x1 = x0 + self.current_length();
        let y1 = y0 + self.current_width();

        [
            (x0 + inset, y0 + inset),
            (x1 - inset, y0 + inset),
            (x0 + inset, y1 - inset),
            (x1 - inset, y1 - inset),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_item_extents_follow_rotation() {
        let mut item = Item::new("P1", 1, 300.0, 200.0, 150.0, 2.0);
        assert_relative_eq!(item.current_length(), 300.0);
        assert_relative_eq!(item.current_width(), 200.0);

        item.rotated = true;
        assert_relative_eq!(item.current_length(), 200.0);
        assert_relative_eq!(item.current_width(), 300.0);
        assert_relative_eq!(item.current_height(), 150.0);
    }

    #[test]
    fn test_rotation_symmetry() {
        // Swapping nominal length/width and flipping the rotation flag
        // yields the same bounding box.
        let mut a = Item::new("P1", 1, 300.0, 200.0, 150.0, 2.0);
        let mut b = Item::new("P1", 2, 200.0, 300.0, 150.0, 2.0);
        a.place_at(Point3::new(50.0, 60.0, 0.0), true);
        b.place_at(Point3::new(50.0, 60.0, 0.0), false);

        assert_eq!(a.aabb(), b.aabb());
    }

    #[test]
    fn test_volume_and_surface() {
        let item = Item::new("P1", 1, 100.0, 80.0, 150.0, 1.0);
        assert_relative_eq!(item.volume(), 1_200_000.0);
        assert_relative_eq!(item.surface_area(), 2.0 * (8000.0 + 15000.0 + 12000.0));
    }

    #[test]
    fn test_validate_rejects_bad_extents() {
        assert!(Item::new("P1", 1, 0.0, 80.0, 150.0, 1.0).validate().is_err());
        assert!(Item::new("P1", 1, 100.0, 80.0, 150.0, 0.0).validate().is_err());
        assert!(Item::new("P1", 1, 100.0, 80.0, 150.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_inset_corners() {
        let item = Item::new("P1", 1, 100.0, 80.0, 150.0, 1.0);
        let corners = item.inset_base_corners(10.0);

        assert_eq!(corners[0], (10.0, 10.0));
        assert_eq!(corners[3], (90.0, 70.0));
    }
}
