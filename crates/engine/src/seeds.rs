//! Deterministic seed orderings for the product-permutation search.
//!
//! Ten heuristic permutations of an order's product types: each of five
//! per-product aggregates sorted both ascending and descending. Ties break
//! on the product id so the orderings are reproducible.

use crate::order::Order;
use std::cmp::Ordering;

struct ProductAggregate {
    product_id: String,
    mean_weight: f64,
    count: f64,
    mean_base_area: f64,
    mean_volume: f64,
    total_volume: f64,
}

fn aggregates(order: &Order) -> Vec<ProductAggregate> {
    order
        .distinct_products()
        .into_iter()
        .map(|product| {
            let mut count = 0.0;
            let mut weight = 0.0;
            let mut base_area = 0.0;
            let mut volume = 0.0;
            for item in order.items().iter().filter(|i| i.product_id == product) {
                count += 1.0;
                weight += item.weight;
                base_area += item.length * item.width;
                volume += item.volume();
            }
            ProductAggregate {
                product_id: product.to_string(),
                mean_weight: weight / count,
                count,
                mean_base_area: base_area / count,
                mean_volume: volume / count,
                total_volume: volume,
            }
        })
        .collect()
}

/// The ten seed permutations of the order's product ids.
///
/// When the order has fewer products than sort keys the orderings may
/// coincide; duplicates are intentional.
pub fn seed_orderings(order: &Order) -> Vec<Vec<String>> {
    let aggregates = aggregates(order);
    let keys: [fn(&ProductAggregate) -> f64; 5] = [
        |a| a.mean_weight,
        |a| a.count,
        |a| a.mean_base_area,
        |a| a.mean_volume,
        |a| a.total_volume,
    ];

    let mut orderings = Vec::with_capacity(keys.len() * 2);
    for key in keys {
        for descending in [false, true] {
            let mut sorted: Vec<&ProductAggregate> = aggregates.iter().collect();
            sorted.sort_by(|a, b| {
                let ordering = key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
                let ordering = if descending { ordering.reverse() } else { ordering };
                ordering.then_with(|| a.product_id.cmp(&b.product_id))
            });
            orderings.push(sorted.iter().map(|a| a.product_id.clone()).collect());
        }
    }

    orderings
}
