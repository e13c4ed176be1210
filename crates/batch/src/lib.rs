//! # Palletize Batch
//!
//! Batch runner around the Palletize engine: order-CSV ingest, one
//! independent search per order on a bounded worker pool with deterministic
//! per-order seeding, and the CSV/JSON result emitters.

pub mod driver;
pub mod logging;
pub mod reader;
pub mod stats;
pub mod writer;

// Re-exports
pub use driver::{BatchConfig, BatchDriver, BatchReport, BatchRun, FailedOrder, OrderOutcome};
pub use logging::init_logger;
pub use reader::{read_orders, read_orders_from};
pub use stats::{dataset_stats, DatasetStats};
pub use writer::{append_summary, product_color, write_pallet_details, write_placements, OrderSummary};

/// FNV-1a hash of a string; stable across platforms and runs.
pub fn stable_hash(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in text.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
