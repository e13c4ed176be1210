//! Packing configuration.

use crate::placement::RotationPolicy;
use palletize_core::nsga::NsgaConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default pallet length in mm (Euro pallet).
pub const DEFAULT_PALLET_LENGTH: f64 = 1200.0;
/// Default pallet width in mm (Euro pallet).
pub const DEFAULT_PALLET_WIDTH: f64 = 800.0;
/// Default maximum stacking height in mm.
pub const DEFAULT_PALLET_MAX_HEIGHT: f64 = 1400.0;
/// One extra pallet is budgeted per this many items.
pub const ITEMS_PER_PALLET_BUDGET: usize = 50;

/// Configuration for packing one order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackConfig {
    /// Pallet length in mm.
    pub pallet_length: f64,
    /// Pallet width in mm.
    pub pallet_width: f64,
    /// Maximum stacking height in mm.
    pub pallet_max_height: f64,
    /// Minimum pallet budget per order.
    pub base_max_pallets: usize,
    /// Orientation policy for placement attempts.
    pub rotation: RotationPolicy,
    /// Evolutionary search parameters.
    pub nsga: NsgaConfig,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            pallet_length: DEFAULT_PALLET_LENGTH,
            pallet_width: DEFAULT_PALLET_WIDTH,
            pallet_max_height: DEFAULT_PALLET_MAX_HEIGHT,
            base_max_pallets: 5,
            rotation: RotationPolicy::Allow,
            nsga: NsgaConfig::default(),
        }
    }
}

impl PackConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pallet extents.
    pub fn with_pallet(mut self, length: f64, width: f64, max_height: f64) -> Self {
        self.pallet_length = length;
        self.pallet_width = width;
        self.pallet_max_height = max_height;
        self
    }

    /// Sets the minimum pallet budget.
    pub fn with_base_max_pallets(mut self, count: usize) -> Self {
        self.base_max_pallets = count.max(1);
        self
    }

    /// Sets the rotation policy.
    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the search parameters.
    pub fn with_nsga(mut self, nsga: NsgaConfig) -> Self {
        self.nsga = nsga;
        self
    }

    /// Pallet budget for an order: the base budget, grown for large orders.
    pub fn pallet_budget(&self, item_count: usize) -> usize {
        self.base_max_pallets
            .max(item_count.div_ceil(ITEMS_PER_PALLET_BUDGET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pallet_budget_floor() {
        let config = PackConfig::default();
        assert_eq!(config.pallet_budget(0), 5);
        assert_eq!(config.pallet_budget(27), 5);
        assert_eq!(config.pallet_budget(250), 5);
    }

    #[test]
    fn test_pallet_budget_scales_with_items() {
        let config = PackConfig::default();
        assert_eq!(config.pallet_budget(251), 6);
        assert_eq!(config.pallet_budget(1200), 24);
    }
}
