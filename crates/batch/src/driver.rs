//! Parallel order driver.
//!
//! Each order runs one independent search on a bounded worker pool. The
//! per-order RNG is seeded from the base seed and a stable hash of the
//! order id, so per-order streams are disjoint and the batch output is
//! identical for any pool size or scheduling. Results land in an
//! append-only collector and are sorted by order id before emission.

use crate::stable_hash;
use crate::writer::OrderSummary;
use palletize_engine::{pack_order, Order, PackConfig, PackedOrder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Number of failed orders listed when printing a report.
const PRINTED_FAILURES: usize = 10;

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Base seed; each order derives its own disjoint RNG stream from it.
    pub base_seed: u64,
    /// Worker pool size. Zero selects the machine parallelism clamped to
    /// `2..=8`; explicit values are taken as given.
    pub threads: usize,
    /// Per-order packing configuration.
    pub pack: PackConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base_seed: 42,
            threads: 0,
            pack: PackConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base seed.
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets the worker pool size (0 = auto).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the packing configuration.
    pub fn with_pack(mut self, pack: PackConfig) -> Self {
        self.pack = pack;
        self
    }

    /// Resolves the worker pool size.
    pub fn resolve_threads(&self) -> usize {
        if self.threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(2, 8)
        } else {
            self.threads
        }
    }
}

/// Result of one order: its summary row plus the committed placements.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    /// Summary row for the batch output.
    pub summary: OrderSummary,
    /// The committed pallets and unplaced items.
    pub packed: PackedOrder,
    /// Distinct product types of the order.
    pub product_count: usize,
}

/// An order whose search raised an unexpected panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedOrder {
    pub order_id: String,
    pub error: String,
}

/// Completed batch run, sorted by order id.
#[derive(Debug)]
pub struct BatchRun {
    /// Per-order outcomes, sorted by order id.
    pub outcomes: Vec<OrderOutcome>,
    /// Orders that failed, sorted by order id.
    pub failed: Vec<FailedOrder>,
    /// Worker pool size used.
    pub threads: usize,
    /// Total wall-clock time in milliseconds.
    pub elapsed_ms: f64,
}

impl BatchRun {
    /// Builds the serializable report of this run.
    pub fn report(&self, base_seed: u64) -> BatchReport {
        BatchReport {
            base_seed,
            threads: self.threads,
            order_count: self.outcomes.len() + self.failed.len(),
            failed_count: self.failed.len(),
            elapsed_ms: self.elapsed_ms,
            summaries: self.outcomes.iter().map(|o| o.summary.clone()).collect(),
            failed: self.failed.clone(),
        }
    }
}

/// Serializable batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub base_seed: u64,
    pub threads: usize,
    pub order_count: usize,
    pub failed_count: usize,
    pub elapsed_ms: f64,
    pub summaries: Vec<OrderSummary>,
    pub failed: Vec<FailedOrder>,
}

impl BatchReport {
    /// Saves the report as JSON.
    pub fn save_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n{:=<72}", "");
        println!("BATCH RESULTS");
        println!("{:=<72}", "");
        println!(
            "{:<12} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "Order", "Items", "Pallets", "Placed", "Unplaced", "VolUtil%", "Time(ms)"
        );
        for row in &self.summaries {
            println!(
                "{:<12} {:>8} {:>8} {:>10} {:>10} {:>10.1} {:>10.1}",
                row.order_id,
                row.item_count,
                row.pallets_used,
                row.items_placed,
                row.items_unplaced,
                row.avg_volume_utilization * 100.0,
                row.execution_time_ms,
            );
        }
        println!(
            "\n{} orders, {} failed, {} workers, {:.1} ms total",
            self.order_count, self.failed_count, self.threads, self.elapsed_ms
        );
        for failure in self.failed.iter().take(PRINTED_FAILURES) {
            println!("  failed {}: {}", failure.order_id, failure.error);
        }
        if self.failed.len() > PRINTED_FAILURES {
            println!("  ... and {} more", self.failed.len() - PRINTED_FAILURES);
        }
    }
}

/// Runs one independent search per order on a bounded worker pool.
pub struct BatchDriver {
    config: BatchConfig,
}

impl BatchDriver {
    /// Creates a new driver.
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// The RNG seed of one order: base seed plus the stable hash of the
    /// order id. Never shared between orders.
    pub fn order_seed(&self, order_id: &str) -> u64 {
        self.config.base_seed.wrapping_add(stable_hash(order_id))
    }

    /// Runs the whole batch. A panicking order is recorded and skipped;
    /// the remaining orders are unaffected.
    pub fn run(&self, orders: &[Order]) -> palletize_core::Result<BatchRun> {
        let start = Instant::now();
        let threads = self.config.resolve_threads();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| palletize_core::Error::Internal(e.to_string()))?;

        let outcomes: Mutex<Vec<OrderOutcome>> = Mutex::new(Vec::with_capacity(orders.len()));
        let failed: Mutex<Vec<FailedOrder>> = Mutex::new(Vec::new());
        let completed = AtomicUsize::new(0);
        let total = orders.len();

        pool.install(|| {
            use rayon::prelude::*;

            orders.par_iter().for_each(|order| {
                let seed = self.order_seed(&order.order_id);
                let result = catch_unwind(AssertUnwindSafe(|| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    pack_order(order, &self.config.pack, &mut rng)
                }));

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                match result {
                    Ok(packed) => {
                        log::info!(
                            "[{}/{}] order {}: {} pallets, {}/{} items, {:.1} ms",
                            done,
                            total,
                            packed.order_id,
                            packed.pallets_used(),
                            packed.items_placed(),
                            order.len(),
                            packed.outcome.elapsed_ms,
                        );
                        let outcome = OrderOutcome {
                            summary: OrderSummary::from_packed(order, &packed),
                            product_count: order.product_count(),
                            packed,
                        };
                        match outcomes.lock() {
                            Ok(mut guard) => guard.push(outcome),
                            Err(poisoned) => poisoned.into_inner().push(outcome),
                        }
                    }
                    Err(_) => {
                        log::error!(
                            "[{}/{}] order {} panicked during search, skipping",
                            done,
                            total,
                            order.order_id
                        );
                        let failure = FailedOrder {
                            order_id: order.order_id.clone(),
                            error: "panic during search".to_string(),
                        };
                        match failed.lock() {
                            Ok(mut guard) => guard.push(failure),
                            Err(poisoned) => poisoned.into_inner().push(failure),
                        }
                    }
                }
            });
        });

        let mut outcomes = outcomes.into_inner().unwrap_or_else(|p| p.into_inner());
        let mut failed = failed.into_inner().unwrap_or_else(|p| p.into_inner());
        outcomes.sort_by(|a, b| a.packed.order_id.cmp(&b.packed.order_id));
        failed.sort_by(|a, b| a.order_id.cmp(&b.order_id));

        Ok(BatchRun {
            outcomes,
            failed,
            threads,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
