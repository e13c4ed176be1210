//! Constructive pre-packing seam ahead of the evolutionary search.
//!
//! A [`Prepacker`] may build complete pallets up front and hand only the
//! residual items to the search. The default implementation packs nothing,
//! so every item reaches the search; a layer- or block-building stage can
//! replace it without touching the pipeline.

use crate::item::Item;
use crate::pallet::Pallet;

/// Output of a pre-packing stage.
#[derive(Debug, Clone, Default)]
pub struct Prepacked {
    /// Pallets completed by the pre-packer.
    pub pallets: Vec<Pallet>,
    /// Items left for the evolutionary search.
    pub residuals: Vec<Item>,
}

/// A constructive stage that runs before the evolutionary search.
pub trait Prepacker {
    /// Splits the order's items into finished pallets and residuals.
    fn prepack(&self, items: Vec<Item>) -> Prepacked;
}

/// The identity pre-packer: builds no pallets, all items are residuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughPrepacker;

impl Prepacker for PassthroughPrepacker {
    fn prepack(&self, items: Vec<Item>) -> Prepacked {
        Prepacked {
            pallets: Vec::new(),
            residuals: items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_keeps_all_items_residual() {
        let items: Vec<Item> = (1..=3)
            .map(|id| Item::new("A", id, 100.0, 80.0, 60.0, 1.0))
            .collect();

        let prepacked = PassthroughPrepacker.prepack(items.clone());
        assert!(prepacked.pallets.is_empty());
        assert_eq!(prepacked.residuals.len(), items.len());
    }
}
