//! Result CSV emitters.
//!
//! Three files describe a batch: a summary row per order (appended across
//! runs), a per-pallet detail file per order, and a per-item placements
//! file per order that the 3D viewer consumes. Writers must be fed results
//! in sorted order; they do no reordering of their own.

use crate::stable_hash;
use palletize_engine::{pallet_compactness, Order, PackedOrder, Pallet};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Hue step between product colors, in degrees.
const GOLDEN_ANGLE: f64 = 137.50776405;

/// One summary row of the batch output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub algorithm: String,
    pub item_count: usize,
    pub product_types: usize,
    pub entropy: f64,
    pub complexity: String,
    pub pallets_used: usize,
    pub items_placed: usize,
    pub items_unplaced: usize,
    pub avg_volume_utilization: f64,
    pub avg_height_utilization: f64,
    pub total_weight: f64,
    pub avg_heterogeneity: f64,
    pub avg_compactness: f64,
    pub execution_time_ms: f64,
}

impl OrderSummary {
    /// Builds the summary row for one packed order.
    pub fn from_packed(order: &Order, packed: &PackedOrder) -> Self {
        Self {
            order_id: packed.order_id.clone(),
            algorithm: "NSGA-II".to_string(),
            item_count: order.len(),
            product_types: order.product_count(),
            entropy: order.entropy(),
            complexity: order.complexity_class().label().to_string(),
            pallets_used: packed.pallets_used(),
            items_placed: packed.items_placed(),
            items_unplaced: packed.items_unplaced(),
            avg_volume_utilization: packed.avg_volume_utilization(),
            avg_height_utilization: packed.avg_height_utilization(),
            total_weight: packed.total_weight(),
            avg_heterogeneity: packed.outcome.heterogeneity,
            avg_compactness: packed.outcome.compactness,
            execution_time_ms: packed.outcome.elapsed_ms,
        }
    }
}

const SUMMARY_HEADER: &str = "OrderId,Algorithm,ItemCount,ProductTypes,Entropy,Complexity,\
PalletsUsed,ItemsPlaced,ItemsUnplaced,AvgVolumeUtilization,AvgHeightUtilization,TotalWeight,\
AvgHeterogeneity,AvgCompactness,ExecutionTimeMs";

/// Appends summary rows, writing the header only when the file is new.
pub fn append_summary(path: &Path, rows: &[OrderSummary]) -> std::io::Result<()> {
    let new_file = !path.exists() || path.metadata()?.len() == 0;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if new_file {
        writeln!(file, "{SUMMARY_HEADER}")?;
    }
    for row in rows {
        writeln!(
            file,
            "{},{},{},{},{:.4},{},{},{},{},{:.4},{:.4},{:.2},{:.4},{:.4},{:.2}",
            row.order_id,
            row.algorithm,
            row.item_count,
            row.product_types,
            row.entropy,
            row.complexity,
            row.pallets_used,
            row.items_placed,
            row.items_unplaced,
            row.avg_volume_utilization,
            row.avg_height_utilization,
            row.total_weight,
            row.avg_heterogeneity,
            row.avg_compactness,
            row.execution_time_ms,
        )?;
    }

    Ok(())
}

/// Writes the per-pallet detail file of one order.
pub fn write_pallet_details(
    path: &Path,
    order_id: &str,
    product_count: usize,
    pallets: &[Pallet],
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "OrderId,PalletId,ItemCount,ProductTypes,VolumeUtilization,HeightUtilization,Weight,\
Heterogeneity,Compactness,Products"
    )?;

    let k = product_count.max(1) as f64;
    for pallet in pallets {
        let census = pallet
            .product_census()
            .iter()
            .map(|(product, count)| format!("{product}({count})"))
            .collect::<Vec<_>>()
            .join(";");

        writeln!(
            file,
            "{},{},{},{},{:.4},{:.4},{:.2},{:.4},{:.4},\"{}\"",
            order_id,
            pallet.pallet_id,
            pallet.len(),
            pallet.product_type_count(),
            pallet.volume_utilization(),
            pallet.height_utilization(),
            pallet.total_weight(),
            pallet.product_type_count() as f64 / k,
            pallet_compactness(pallet),
            census,
        )?;
    }

    Ok(())
}

/// Writes the per-item placements file of one order.
pub fn write_placements(path: &Path, order_id: &str, pallets: &[Pallet]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "OrderId,PalletId,ItemId,ProductId,X,Y,Z,Length,Width,Height,Weight,IsRotated,\
PalletLength,PalletWidth,PalletMaxHeight,Color"
    )?;

    for pallet in pallets {
        for item in pallet.items() {
            writeln!(
                file,
                "{},{},{},{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.1},{:.2},{},{:.1},{:.1},{:.1},{}",
                order_id,
                pallet.pallet_id,
                item.item_id,
                item.product_id,
                item.position.x,
                item.position.y,
                item.position.z,
                item.length,
                item.width,
                item.height,
                item.weight,
                item.rotated,
                pallet.length,
                pallet.width,
                pallet.max_height,
                product_color(&item.product_id),
            )?;
        }
    }

    Ok(())
}

/// Deterministic display color for a product id: hash → golden-angle hue →
/// HSL → RGB hex.
pub fn product_color(product_id: &str) -> String {
    let hue = (stable_hash(product_id) % 1000) as f64 * GOLDEN_ANGLE % 360.0;
    let (r, g, b) = hsl_to_rgb(hue, 0.62, 0.55);
    format!("#{r:02X}{g:02X}{b:02X}")
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match hue {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}
