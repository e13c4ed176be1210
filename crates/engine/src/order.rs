//! Order representation and derived complexity metrics.

use crate::item::Item;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complexity class of an order: five equal-width intervals of the
/// normalized product-mix entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComplexityClass {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ComplexityClass {
    /// Classifies a normalized entropy value in `[0, 1]`.
    pub fn from_entropy(entropy: f64) -> Self {
        match entropy {
            e if e < 0.2 => ComplexityClass::VeryLow,
            e if e < 0.4 => ComplexityClass::Low,
            e if e < 0.6 => ComplexityClass::Medium,
            e if e < 0.8 => ComplexityClass::High,
            _ => ComplexityClass::VeryHigh,
        }
    }

    /// Returns a display label.
    pub fn label(&self) -> &'static str {
        match self {
            ComplexityClass::VeryLow => "VeryLow",
            ComplexityClass::Low => "Low",
            ComplexityClass::Medium => "Medium",
            ComplexityClass::High => "High",
            ComplexityClass::VeryHigh => "VeryHigh",
        }
    }
}

/// Size class of an order by item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeClass {
    /// Fewer than 600 items.
    Small,
    /// Fewer than 1300 items.
    Medium,
    /// 1300 items or more.
    Large,
}

impl SizeClass {
    /// Classifies an order by its item count.
    pub fn from_item_count(count: usize) -> Self {
        if count < 600 {
            SizeClass::Small
        } else if count < 1300 {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    /// Returns a display label.
    pub fn label(&self) -> &'static str {
        match self {
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
        }
    }
}

/// An order: a multiset of items sharing one destination.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    /// Order identity.
    pub order_id: String,
    items: Vec<Item>,
}

impl Order {
    /// Creates a new order.
    pub fn new(order_id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            order_id: order_id.into(),
            items,
        }
    }

    /// Returns the items in input order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct product ids in first-appearance order.
    pub fn distinct_products(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.product_id.as_str()) {
                seen.push(item.product_id.as_str());
            }
        }
        seen
    }

    /// Number of distinct product ids.
    pub fn product_count(&self) -> usize {
        self.distinct_products().len()
    }

    /// Total item weight in kg.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.weight).sum()
    }

    /// Total item volume in mm³.
    pub fn total_volume(&self) -> f64 {
        self.items.iter().map(Item::volume).sum()
    }

    /// Shannon entropy of the product-count distribution, normalized to
    /// `[0, 1]` by log₂ of the distinct-product count. Zero when the order
    /// holds at most one product.
    pub fn entropy(&self) -> f64 {
        let products = self.distinct_products();
        let k = products.len();
        if k <= 1 {
            return 0.0;
        }

        let n = self.items.len() as f64;
        let mut entropy = 0.0;
        for product in products {
            let count = self
                .items
                .iter()
                .filter(|i| i.product_id == product)
                .count() as f64;
            let p = count / n;
            entropy -= p * p.log2();
        }

        entropy / (k as f64).log2()
    }

    /// Complexity class derived from the entropy.
    pub fn complexity_class(&self) -> ComplexityClass {
        ComplexityClass::from_entropy(self.entropy())
    }

    /// Size class derived from the item count.
    pub fn size_class(&self) -> SizeClass {
        SizeClass::from_item_count(self.len())
    }
}
