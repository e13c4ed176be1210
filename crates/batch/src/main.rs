//! Palletize batch CLI.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use palletize_batch::{
    append_summary, dataset_stats, init_logger, read_orders, write_pallet_details,
    write_placements, BatchConfig, BatchDriver, BatchRun,
};
use palletize_engine::Order;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "palletize")]
#[command(about = "Multi-pallet 3D packing batch runner")]
#[command(version)]
struct Cli {
    /// Path to the orders CSV dataset
    #[arg(short, long, default_value = "orders.csv")]
    dataset: PathBuf,

    /// Worker threads (0 = machine parallelism clamped to 2..=8)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Base seed for the per-order RNG streams
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Output directory for result files
    #[arg(short, long, default_value = "results")]
    out_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack every order of the dataset across the worker pool
    Run,

    /// Pack the dataset in fixed-size chunks
    Batch {
        /// Orders per chunk
        #[arg(short = 'n', long, default_value_t = 16)]
        size: usize,
    },

    /// Pack every order on a single worker
    Sequential,

    /// Pack one order of the dataset
    Single {
        /// Order id to pack
        order_id: String,
    },

    /// Print dataset statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger(level)?;

    let orders = read_orders(&cli.dataset)
        .with_context(|| format!("reading dataset {}", cli.dataset.display()))?;
    log::info!(
        "loaded {} orders ({} items) from {}",
        orders.len(),
        orders.iter().map(Order::len).sum::<usize>(),
        cli.dataset.display()
    );

    match &cli.command {
        Commands::Run => {
            let run = run_batch(&cli, &orders, cli.threads)?;
            emit(&cli, &run)?;
        }
        Commands::Batch { size } => {
            for chunk in orders.chunks((*size).max(1)) {
                let run = run_batch(&cli, chunk, cli.threads)?;
                emit(&cli, &run)?;
            }
        }
        Commands::Sequential => {
            let run = run_batch(&cli, &orders, 1)?;
            emit(&cli, &run)?;
        }
        Commands::Single { order_id } => {
            let Some(order) = orders.iter().find(|o| &o.order_id == order_id) else {
                bail!("order {} not found in dataset", order_id);
            };
            let run = run_batch(&cli, std::slice::from_ref(order), 1)?;
            emit(&cli, &run)?;
        }
        Commands::Stats => {
            dataset_stats(&orders).print();
        }
    }

    Ok(())
}

fn run_batch(cli: &Cli, orders: &[Order], threads: usize) -> anyhow::Result<BatchRun> {
    let config = BatchConfig::new()
        .with_base_seed(cli.seed)
        .with_threads(threads);
    let driver = BatchDriver::new(config);
    Ok(driver.run(orders)?)
}

fn emit(cli: &Cli, run: &BatchRun) -> anyhow::Result<()> {
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let summaries: Vec<_> = run.outcomes.iter().map(|o| o.summary.clone()).collect();
    append_summary(&cli.out_dir.join("summary.csv"), &summaries)?;

    for outcome in &run.outcomes {
        let order_id = &outcome.packed.order_id;
        write_pallet_details(
            &cli.out_dir.join(format!("order_{order_id}_pallets.csv")),
            order_id,
            outcome.product_count,
            &outcome.packed.pallets,
        )?;
        write_placements(
            &cli.out_dir.join(format!("order_{order_id}_placements.csv")),
            order_id,
            &outcome.packed.pallets,
        )?;
    }

    let report = run.report(cli.seed);
    report.save_json(&cli.out_dir.join("report.json"))?;
    report.print_summary();

    Ok(())
}
