//! # Palletize Engine
//!
//! Multi-pallet 3D packing for the Palletize engine.
//!
//! Given an order — a multiset of rectangular boxes with product identity —
//! the engine assigns every item to a pallet, a position and an orientation
//! so that bounds, non-overlap, support and load stability hold, while a
//! three-objective evolutionary search over product orderings maximizes
//! volume utilization and compactness and minimizes product mixing per
//! pallet.
//!
//! ## Pipeline
//!
//! - [`prepack`]: optional constructive stage (identity by default)
//! - [`extreme_points`] + [`constraints`] + [`placement`]: the geometric
//!   kernel that commits items onto one pallet
//! - [`evaluator`]: decodes a product ordering across a pallet budget and
//!   scores it
//! - [`search`]: runs the evolutionary loop and commits the incumbent
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod config;
pub mod constraints;
pub mod evaluator;
pub mod extreme_points;
pub mod item;
pub mod order;
pub mod pallet;
pub mod placement;
pub mod prepack;
pub mod search;
pub mod seeds;

// Re-exports
pub use config::{
    PackConfig, DEFAULT_PALLET_LENGTH, DEFAULT_PALLET_MAX_HEIGHT, DEFAULT_PALLET_WIDTH,
};
pub use evaluator::{contact_ratio, pallet_compactness, PackingProblem, ProductOrdering};
pub use extreme_points::{ExtremePoint, ExtremePointSet};
pub use item::Item;
pub use order::{ComplexityClass, Order, SizeClass};
pub use pallet::Pallet;
pub use placement::{PlacementEngine, RotationPolicy};
pub use prepack::{PassthroughPrepacker, Prepacked, Prepacker};
pub use search::{pack_order, PackedOrder, SearchOutcome};
pub use seeds::seed_orderings;
