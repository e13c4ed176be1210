//! Placement engine: commits items onto one pallet through its
//! extreme-point set.

use crate::constraints::{fits_within, is_stable_with, is_supported, overlaps_any};
use crate::extreme_points::ExtremePointSet;
use crate::item::Item;
use crate::pallet::Pallet;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orientation policy for placement attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RotationPolicy {
    /// Try the nominal orientation, then the 90° rotation about Z.
    #[default]
    Allow,
    /// Only the nominal orientation.
    Forbid,
}

impl RotationPolicy {
    fn orientations(self) -> &'static [bool] {
        match self {
            RotationPolicy::Allow => &[false, true],
            RotationPolicy::Forbid => &[false],
        }
    }
}

/// Drives placements onto a single pallet.
///
/// Owns the pallet and its extreme-point set for the duration of a packing
/// pass; [`into_pallet`](PlacementEngine::into_pallet) releases the pallet
/// once the pass is done.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    pallet: Pallet,
    points: ExtremePointSet,
}

impl PlacementEngine {
    /// Creates an engine over the given pallet with a fresh extreme-point
    /// set (derived from its items when it is not empty).
    pub fn new(pallet: Pallet) -> Self {
        let points = if pallet.is_empty() {
            ExtremePointSet::new(pallet.length, pallet.width, pallet.max_height)
        } else {
            ExtremePointSet::from_items(
                pallet.length,
                pallet.width,
                pallet.max_height,
                pallet.items(),
            )
        };
        Self { pallet, points }
    }

    /// Returns the pallet state.
    pub fn pallet(&self) -> &Pallet {
        &self.pallet
    }

    /// Returns the extreme-point set.
    pub fn points(&self) -> &ExtremePointSet {
        &self.points
    }

    /// Releases the pallet.
    pub fn into_pallet(self) -> Pallet {
        self.pallet
    }

    /// Attempts to place a clone of `item` on this pallet.
    ///
    /// Extreme points are scanned in priority order, skipping used ones;
    /// each orientation allowed by `rotation` is tried at each point. A
    /// candidate must pass bounds, non-overlap, support and stability, in
    /// that order. On success the point is flagged, the derived points are
    /// inserted and the item is committed. On failure the pallet is left
    /// untouched.
    pub fn try_place(&mut self, item: &Item, rotation: RotationPolicy) -> bool {
        self.points.sort_by_priority();

        for index in 0..self.points.len() {
            let point = self.points.points()[index];
            if point.used {
                continue;
            }

            for &rotated in rotation.orientations() {
                let mut candidate = item.clone();
                candidate.place_at(Point3::new(point.x, point.y, point.z), rotated);

                if !fits_within(&candidate, &self.pallet) {
                    continue;
                }
                if overlaps_any(&candidate, &self.pallet) {
                    continue;
                }
                if !is_supported(&candidate, &self.pallet) {
                    continue;
                }
                if !is_stable_with(&candidate, &self.pallet) {
                    continue;
                }

                self.points.mark_used(index);
                self.points.register_placement(&candidate);
                self.pallet.push(candidate);
                return true;
            }
        }

        false
    }
}
