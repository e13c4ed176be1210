//! Axis-aligned geometry primitives shared across the packing pipeline.
//!
//! All coordinates are millimetres in pallet space: the origin is the
//! pallet's bottom-front-left corner, X runs along the length, Y along the
//! width and Z upward. Every tolerance comparison in the workspace goes
//! through [`EPSILON`].

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric tolerance in millimetres.
///
/// Used uniformly for overlap, bounds, same-position and same-height tests.
pub const EPSILON: f64 = 0.1;

/// An axis-aligned box given by its minimum corner and extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Extents along X, Y, Z (all positive).
    pub extents: Vector3<f64>,
}

impl Aabb {
    /// Creates a new box from its minimum corner and extents.
    pub fn new(min: Point3<f64>, extents: Vector3<f64>) -> Self {
        Self { min, extents }
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Point3<f64> {
        self.min + self.extents
    }

    /// Returns the geometric center.
    pub fn center(&self) -> Point3<f64> {
        self.min + self.extents / 2.0
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        self.extents.x * self.extents.y * self.extents.z
    }

    /// Returns the base (XY footprint) area.
    pub fn base_area(&self) -> f64 {
        self.extents.x * self.extents.y
    }

    /// Tests whether two boxes overlap with [`EPSILON`] slack.
    ///
    /// The intervals must be open-overlapping by at least `EPSILON` on every
    /// axis to count as overlapping; the test short-circuits on the first
    /// separating axis.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();

        if !(self.min.x < b_max.x - EPSILON && a_max.x > other.min.x + EPSILON) {
            return false;
        }
        if !(self.min.y < b_max.y - EPSILON && a_max.y > other.min.y + EPSILON) {
            return false;
        }
        self.min.z < b_max.z - EPSILON && a_max.z > other.min.z + EPSILON
    }

    /// Area of the XY-footprint intersection of two boxes.
    pub fn xy_overlap_area(&self, other: &Aabb) -> f64 {
        let a_max = self.max();
        let b_max = other.max();
        interval_overlap(self.min.x, a_max.x, other.min.x, b_max.x)
            * interval_overlap(self.min.y, a_max.y, other.min.y, b_max.y)
    }
}

/// Length of the intersection of the intervals `[a_min, a_max]` and
/// `[b_min, b_max]`, clamped to zero.
pub fn interval_overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
}

/// Weight-weighted mean of a set of points.
///
/// Returns `fallback` when the total weight is not positive.
pub fn weighted_center<I>(points: I, fallback: Point3<f64>) -> Point3<f64>
where
    I: IntoIterator<Item = (Point3<f64>, f64)>,
{
    let mut acc = Vector3::zeros();
    let mut total = 0.0;

    for (point, weight) in points {
        acc += point.coords * weight;
        total += weight;
    }

    if total > 0.0 {
        Point3::from(acc / total)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn aabb(x: f64, y: f64, z: f64, l: f64, w: f64, h: f64) -> Aabb {
        Aabb::new(Point3::new(x, y, z), Vector3::new(l, w, h))
    }

    #[test]
    fn test_max_and_center() {
        let b = aabb(10.0, 20.0, 30.0, 100.0, 50.0, 40.0);
        assert_relative_eq!(b.max().x, 110.0);
        assert_relative_eq!(b.center().x, 60.0);
        assert_relative_eq!(b.center().y, 45.0);
        assert_relative_eq!(b.center().z, 50.0);
    }

    #[test]
    fn test_overlap_basic() {
        let a = aabb(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let b = aabb(5.0, 5.0, 5.0, 10.0, 10.0, 10.0);
        let c = aabb(15.0, 0.0, 0.0, 10.0, 10.0, 10.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_touching_faces_do_not_overlap() {
        // Face-to-face contact within tolerance is not an overlap.
        let a = aabb(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let b = aabb(10.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let c = aabb(10.0 - EPSILON / 2.0, 0.0, 0.0, 10.0, 10.0, 10.0);

        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_xy_overlap_area() {
        let a = aabb(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let b = aabb(5.0, 5.0, 50.0, 10.0, 10.0, 10.0);
        let c = aabb(20.0, 20.0, 0.0, 10.0, 10.0, 10.0);

        assert_relative_eq!(a.xy_overlap_area(&b), 25.0);
        assert_relative_eq!(a.xy_overlap_area(&c), 0.0);
    }

    #[test]
    fn test_weighted_center() {
        let points = vec![
            (Point3::new(0.0, 0.0, 0.0), 1.0),
            (Point3::new(10.0, 0.0, 0.0), 3.0),
        ];
        let com = weighted_center(points, Point3::origin());
        assert_relative_eq!(com.x, 7.5, epsilon = 1e-6);
    }

    #[test]
    fn test_weighted_center_zero_weight_falls_back() {
        let fallback = Point3::new(600.0, 400.0, 0.0);
        let com = weighted_center(std::iter::empty::<(Point3<f64>, f64)>(), fallback);
        assert_eq!(com, fallback);

        let weightless = vec![(Point3::new(1.0, 2.0, 3.0), 0.0)];
        assert_eq!(weighted_center(weightless, fallback), fallback);
    }
}
