//! Order dataset ingest.
//!
//! Orders arrive as a CSV with the header
//! `Order,Product,Quantity,Length,Width,Height,Weight`; one row is one
//! product line of one order, and `Quantity` items are materialized with
//! sequential ids per order. Rows with fewer than seven fields, fields
//! that fail to parse, or extents that fail item validation are skipped
//! and processing continues.

use palletize_core::Result;
use palletize_engine::{Item, Order};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads all orders from a CSV file, in first-appearance order.
pub fn read_orders(path: &Path) -> Result<Vec<Order>> {
    let file = File::open(path)?;
    read_orders_from(BufReader::new(file))
}

/// Reads all orders from any buffered CSV source.
pub fn read_orders_from(reader: impl BufRead) -> Result<Vec<Order>> {
    let mut grouped: Vec<(String, Vec<Item>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut next_item_id: HashMap<String, usize> = HashMap::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line_index == 0 || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < 7 {
            log::warn!("skipping malformed dataset row {}", line_index + 1);
            continue;
        }

        let order_id = fields[0].to_string();
        let product_id = fields[1].to_string();
        let parsed = (
            fields[2].parse::<usize>(),
            fields[3].parse::<f64>(),
            fields[4].parse::<f64>(),
            fields[5].parse::<f64>(),
            fields[6].parse::<f64>(),
        );
        let (Ok(quantity), Ok(length), Ok(width), Ok(height), Ok(weight)) = parsed else {
            log::warn!("skipping unparsable dataset row {}", line_index + 1);
            continue;
        };
        let prototype = Item::new(&product_id, 0, length, width, height, weight);
        if let Err(error) = prototype.validate() {
            log::warn!("skipping dataset row {}: {}", line_index + 1, error);
            continue;
        }

        let index = *group_index.entry(order_id.clone()).or_insert_with(|| {
            grouped.push((order_id.clone(), Vec::new()));
            grouped.len() - 1
        });
        let counter = next_item_id.entry(order_id).or_insert(1);

        for _ in 0..quantity {
            let mut item = prototype.clone();
            item.item_id = *counter;
            grouped[index].1.push(item);
            *counter += 1;
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(order_id, items)| Order::new(order_id, items))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Order,Product,Quantity,Length,Width,Height,Weight\n";

    fn parse(rows: &str) -> Vec<Order> {
        let data = format!("{HEADER}{rows}");
        read_orders_from(Cursor::new(data)).expect("parse")
    }

    #[test]
    fn test_quantity_materializes_sequential_ids() {
        let orders = parse("16129,93215,3,290,240,170,1.36\n");

        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.order_id, "16129");
        assert_eq!(order.len(), 3);
        let ids: Vec<usize> = order.items().iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(order.items()[0].product_id, "93215");
    }

    #[test]
    fn test_multiple_rows_same_order_continue_ids() {
        let orders = parse(
            "16129,93215,2,290,240,170,1.36\n\
             16129,41772,2,350,260,200,2.4\n",
        );

        let order = &orders[0];
        assert_eq!(order.len(), 4);
        let ids: Vec<usize> = order.items().iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(order.product_count(), 2);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let orders = parse(
            "16129,93215,2,290,240,170,1.36\n\
             16129,41772,2,350\n\
             16130,88003,1,190,150,120,0.85\n",
        );

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].len(), 2);
        assert_eq!(orders[1].len(), 1);
    }

    #[test]
    fn test_unparsable_rows_are_skipped() {
        let orders = parse(
            "16129,93215,two,290,240,170,1.36\n\
             16129,41772,1,350,260,200,-2.4\n\
             16129,88003,1,190,150,120,0.85\n",
        );

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].len(), 1);
        assert_eq!(orders[0].items()[0].product_id, "88003");
    }

    #[test]
    fn test_orders_keep_first_appearance_order() {
        let orders = parse(
            "B,93215,1,290,240,170,1.36\n\
             A,41772,1,350,260,200,2.4\n\
             B,88003,1,190,150,120,0.85\n",
        );

        let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(orders[0].len(), 2);
    }

    #[test]
    fn test_empty_dataset() {
        let orders = parse("");
        assert!(orders.is_empty());
    }
}
