//! Constraint kernel: the pure predicates a tentative placement must pass.
//!
//! All predicates take the candidate item (already positioned and oriented)
//! and the target pallet; none of them mutates either. The placement engine
//! checks them in order — bounds, non-overlap, support, stability — and
//! short-circuits on the first failure.

use crate::item::{Item, CORNER_INSET};
use crate::pallet::Pallet;
use palletize_core::{weighted_center, EPSILON};

/// Minimum supported-area ratios paired with the minimum number of
/// supported base corners that make a placement count as supported. The
/// most permissive area threshold is checked first as a pure early exit.
const SUPPORT_RULES: [(f64, usize); 3] = [(0.75, 2), (0.50, 3), (0.40, 4)];

/// Bounds check: the item's max corner must lie within the pallet box,
/// with tolerance.
pub fn fits_within(item: &Item, pallet: &Pallet) -> bool {
    let max = item.aabb().max();
    max.x <= pallet.length + EPSILON
        && max.y <= pallet.width + EPSILON
        && max.z <= pallet.max_height + EPSILON
}

/// Non-overlap check against every item already on the pallet.
pub fn overlaps_any(item: &Item, pallet: &Pallet) -> bool {
    let aabb = item.aabb();
    pallet.items().iter().any(|other| aabb.overlaps(&other.aabb()))
}

/// Items of the pallet whose top face is flush with the candidate's bottom.
pub fn supporters<'a>(item: &Item, pallet: &'a Pallet) -> Vec<&'a Item> {
    pallet
        .items()
        .iter()
        .filter(|other| (item.position.z - other.top_z()).abs() < EPSILON)
        .collect()
}

/// Fraction of the candidate's footprint resting on the given supporters.
pub fn support_ratio(item: &Item, supporters: &[&Item]) -> f64 {
    let base_area = item.base_area();
    if base_area <= 0.0 {
        return 0.0;
    }

    let aabb = item.aabb();
    let supported: f64 = supporters
        .iter()
        .map(|other| aabb.xy_overlap_area(&other.aabb()))
        .sum();

    supported / base_area
}

/// Count of the candidate's inset base corners that rest on at least one
/// supporter's footprint.
pub fn supported_corners(item: &Item, supporters: &[&Item]) -> usize {
    item.inset_base_corners(CORNER_INSET)
        .iter()
        .filter(|(cx, cy)| {
            supporters.iter().any(|other| {
                let x0 = other.position.x;
                let y0 = other.position.y;
                let x1 = x0 + other.current_length();
                let y1 = y0 + other.current_width();
                *cx >= x0 - EPSILON && *cx <= x1 + EPSILON && *cy >= y0 - EPSILON && *cy <= y1 + EPSILON
            })
        })
        .count()
}

/// Support check per the area-ratio/corner rule.
///
/// Items on the floor are always supported. Elevated items need a set of
/// flush supporters providing both enough area and enough corner coverage.
pub fn is_supported(item: &Item, pallet: &Pallet) -> bool {
    if item.position.z <= EPSILON {
        return true;
    }

    let supporters = supporters(item, pallet);
    if supporters.is_empty() {
        return false;
    }

    let ratio = support_ratio(item, &supporters);
    let corners = supported_corners(item, &supporters);

    SUPPORT_RULES
        .iter()
        .any(|&(min_ratio, min_corners)| ratio >= min_ratio && corners >= min_corners)
}

/// Center-of-mass tolerance by load size.
///
/// The first few items may spread across the pallet; discipline tightens
/// as the stack grows.
pub fn stability_tolerance(placed_count: usize) -> f64 {
    match placed_count {
        0..=2 => 0.99,
        3..=4 => 0.70,
        5..=9 => 0.50,
        _ => 0.40,
    }
}

/// Stability check: the center of mass of the load including the candidate
/// must project within the dynamic tolerance of the pallet center.
///
/// Computed on the hypothetical load, leaving the pallet untouched.
pub fn is_stable_with(item: &Item, pallet: &Pallet) -> bool {
    let com = weighted_center(
        pallet
            .items()
            .iter()
            .chain(std::iter::once(item))
            .map(|i| (i.aabb().center(), i.weight)),
        pallet.base_center(),
    );

    let tolerance = stability_tolerance(pallet.len() + 1);
    let half_length = pallet.length / 2.0;
    let half_width = pallet.width / 2.0;

    (com.x - half_length).abs() / half_length <= tolerance
        && (com.y - half_width).abs() / half_width <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn item_at(product: &str, id: usize, dims: (f64, f64, f64), pos: (f64, f64, f64)) -> Item {
        let mut item = Item::new(product, id, dims.0, dims.1, dims.2, 1.0);
        item.place_at(Point3::new(pos.0, pos.1, pos.2), false);
        item
    }

    fn euro_pallet() -> Pallet {
        Pallet::new(1, 1200.0, 800.0, 1400.0)
    }

    #[test]
    fn test_bounds() {
        let pallet = euro_pallet();
        let inside = item_at("A", 1, (100.0, 80.0, 150.0), (1100.0, 720.0, 0.0));
        let over_x = item_at("A", 2, (100.0, 80.0, 150.0), (1150.0, 0.0, 0.0));
        let over_z = item_at("A", 3, (100.0, 80.0, 1500.0), (0.0, 0.0, 0.0));

        assert!(fits_within(&inside, &pallet));
        assert!(!fits_within(&over_x, &pallet));
        assert!(!fits_within(&over_z, &pallet));
    }

    #[test]
    fn test_overlap_against_placed_items() {
        let mut pallet = euro_pallet();
        pallet.push(item_at("A", 1, (300.0, 200.0, 150.0), (0.0, 0.0, 0.0)));

        let colliding = item_at("B", 2, (300.0, 200.0, 150.0), (100.0, 50.0, 0.0));
        let beside = item_at("B", 3, (300.0, 200.0, 150.0), (300.0, 0.0, 0.0));

        assert!(overlaps_any(&colliding, &pallet));
        assert!(!overlaps_any(&beside, &pallet));
    }

    #[test]
    fn test_floor_items_are_supported() {
        let pallet = euro_pallet();
        let item = item_at("A", 1, (100.0, 80.0, 150.0), (500.0, 300.0, 0.0));
        assert!(is_supported(&item, &pallet));
    }

    #[test]
    fn test_floating_item_is_unsupported() {
        let pallet = euro_pallet();
        let item = item_at("A", 1, (100.0, 80.0, 150.0), (0.0, 0.0, 200.0));
        assert!(!is_supported(&item, &pallet));
    }

    #[test]
    fn test_fully_stacked_item_is_supported() {
        let mut pallet = euro_pallet();
        pallet.push(item_at("A", 1, (300.0, 200.0, 150.0), (0.0, 0.0, 0.0)));

        let on_top = item_at("B", 2, (300.0, 200.0, 100.0), (0.0, 0.0, 150.0));
        let supporters = supporters(&on_top, &pallet);
        assert_eq!(supporters.len(), 1);
        assert_relative_eq!(support_ratio(&on_top, &supporters), 1.0);
        assert_eq!(supported_corners(&on_top, &supporters), 4);
        assert!(is_supported(&on_top, &pallet));
    }

    #[test]
    fn test_half_overhang_fails_support() {
        let mut pallet = euro_pallet();
        pallet.push(item_at("A", 1, (300.0, 200.0, 150.0), (0.0, 0.0, 0.0)));

        // Shifted half off: 50% area but only 2 corners over the supporter.
        let shifted = item_at("B", 2, (300.0, 200.0, 100.0), (150.0, 0.0, 150.0));
        let supporters = supporters(&shifted, &pallet);
        assert_relative_eq!(support_ratio(&shifted, &supporters), 0.5);
        assert_eq!(supported_corners(&shifted, &supporters), 2);
        assert!(!is_supported(&shifted, &pallet));
    }

    #[test]
    fn test_bridge_over_two_supporters() {
        let mut pallet = euro_pallet();
        pallet.push(item_at("A", 1, (200.0, 200.0, 150.0), (0.0, 0.0, 0.0)));
        pallet.push(item_at("A", 2, (200.0, 200.0, 150.0), (200.0, 0.0, 0.0)));

        // Spans both supporters completely.
        let bridge = item_at("B", 3, (400.0, 200.0, 100.0), (0.0, 0.0, 150.0));
        let supporters = supporters(&bridge, &pallet);
        assert_eq!(supporters.len(), 2);
        assert_relative_eq!(support_ratio(&bridge, &supporters), 1.0);
        assert!(is_supported(&bridge, &pallet));
    }

    #[test]
    fn test_tolerance_schedule() {
        assert_relative_eq!(stability_tolerance(0), 0.99);
        assert_relative_eq!(stability_tolerance(2), 0.99);
        assert_relative_eq!(stability_tolerance(3), 0.70);
        assert_relative_eq!(stability_tolerance(4), 0.70);
        assert_relative_eq!(stability_tolerance(5), 0.50);
        assert_relative_eq!(stability_tolerance(9), 0.50);
        assert_relative_eq!(stability_tolerance(10), 0.40);
        assert_relative_eq!(stability_tolerance(100), 0.40);
    }

    #[test]
    fn test_first_items_pass_stability_anywhere() {
        let pallet = euro_pallet();
        let corner = item_at("A", 1, (100.0, 80.0, 150.0), (0.0, 0.0, 0.0));
        assert!(is_stable_with(&corner, &pallet));
    }

    #[test]
    fn test_lopsided_large_load_fails_stability() {
        let mut pallet = euro_pallet();
        // Ten light items piled into one corner.
        for id in 1..=10 {
            pallet.push(item_at("A", id, (100.0, 80.0, 50.0), (0.0, 0.0, 0.0)));
        }

        let another = item_at("A", 11, (100.0, 80.0, 50.0), (0.0, 0.0, 0.0));
        // COM sits at (50, 40): offset ratio ~0.92 on X against τ = 0.40.
        assert!(!is_stable_with(&another, &pallet));
    }

    #[test]
    fn test_centered_large_load_passes_stability() {
        let mut pallet = euro_pallet();
        for id in 1..=10 {
            pallet.push(item_at("A", id, (100.0, 80.0, 50.0), (550.0, 360.0, 0.0)));
        }

        let another = item_at("A", 11, (100.0, 80.0, 50.0), (550.0, 360.0, 500.0));
        assert!(is_stable_with(&another, &pallet));
    }
}
