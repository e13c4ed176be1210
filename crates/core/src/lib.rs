//! # Palletize Core
//!
//! Core primitives for the Palletize palletizing engine.
//!
//! This crate provides the pieces shared by the placement engine and the
//! batch driver:
//!
//! - **Geometry**: [`Aabb`], ε-tolerant overlap tests and weighted
//!   center-of-mass arithmetic ([`geom`])
//! - **Search framework**: the (μ+λ) three-objective evolutionary loop with
//!   non-dominated sorting and crowding distance ([`nsga`])
//! - **Errors**: the workspace-wide [`Error`] type
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geom;
pub mod nsga;

// Re-exports
pub use error::{Error, Result};
pub use geom::{interval_overlap, weighted_center, Aabb, EPSILON};
pub use nsga::{
    compare_lexicographic, composite, crowding_distance, dominates, non_dominated_sort,
    NsgaConfig, NsgaIndividual, NsgaProblem, NsgaResult, NsgaRunner, Sense, NUM_OBJECTIVES,
};
