//! Dataset statistics.

use palletize_engine::{ComplexityClass, Order, SizeClass};
use serde::{Deserialize, Serialize};

const COMPLEXITY_CLASSES: [ComplexityClass; 5] = [
    ComplexityClass::VeryLow,
    ComplexityClass::Low,
    ComplexityClass::Medium,
    ComplexityClass::High,
    ComplexityClass::VeryHigh,
];

const SIZE_CLASSES: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

/// Aggregate statistics of an order dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub order_count: usize,
    pub item_count: usize,
    pub min_items: usize,
    pub max_items: usize,
    pub mean_items: f64,
    pub mean_product_types: f64,
    pub mean_entropy: f64,
    /// Orders per complexity class, VeryLow through VeryHigh.
    pub complexity_census: [usize; 5],
    /// Orders per size class, Small through Large.
    pub size_census: [usize; 3],
}

/// Computes the statistics of a dataset.
pub fn dataset_stats(orders: &[Order]) -> DatasetStats {
    let order_count = orders.len();
    let item_count: usize = orders.iter().map(Order::len).sum();

    let mut complexity_census = [0usize; 5];
    let mut size_census = [0usize; 3];
    for order in orders {
        let complexity = order.complexity_class();
        let position = COMPLEXITY_CLASSES
            .iter()
            .position(|c| *c == complexity)
            .unwrap_or(0);
        complexity_census[position] += 1;

        let size = order.size_class();
        let position = SIZE_CLASSES.iter().position(|s| *s == size).unwrap_or(0);
        size_census[position] += 1;
    }

    let denominator = order_count.max(1) as f64;
    DatasetStats {
        order_count,
        item_count,
        min_items: orders.iter().map(Order::len).min().unwrap_or(0),
        max_items: orders.iter().map(Order::len).max().unwrap_or(0),
        mean_items: item_count as f64 / denominator,
        mean_product_types: orders
            .iter()
            .map(|o| o.product_count() as f64)
            .sum::<f64>()
            / denominator,
        mean_entropy: orders.iter().map(Order::entropy).sum::<f64>() / denominator,
        complexity_census,
        size_census,
    }
}

impl DatasetStats {
    /// Prints the statistics as a table.
    pub fn print(&self) {
        println!("\n{:=<56}", "");
        println!("DATASET STATISTICS");
        println!("{:=<56}", "");
        println!("Orders:             {}", self.order_count);
        println!("Items:              {}", self.item_count);
        println!(
            "Items per order:    min {}, max {}, mean {:.1}",
            self.min_items, self.max_items, self.mean_items
        );
        println!("Product types/ord:  {:.1}", self.mean_product_types);
        println!("Mean entropy:       {:.4}", self.mean_entropy);

        println!("\nComplexity:");
        for (class, count) in COMPLEXITY_CLASSES.iter().zip(self.complexity_census) {
            println!("  {:<10} {}", class.label(), count);
        }

        println!("\nSize:");
        for (class, count) in SIZE_CLASSES.iter().zip(self.size_census) {
            println!("  {:<10} {}", class.label(), count);
        }
    }
}
