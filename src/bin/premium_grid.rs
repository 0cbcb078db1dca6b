//! Export resolved premiums for every plan and age
//!
//! Writes one row per (plan, age) so age tables can be audited for gaps and
//! overlaps. Unpriceable ages have an empty premium column.
//!
//! Usage: cargo run --bin premium_grid -- --output premium_grid.csv

use anyhow::{Context, Result};
use clap::Parser;
use plan_matcher::matching::{resolve_premium, Premium};
use plan_matcher::plan::{load_catalog, loader::DEFAULT_CATALOG_PATH};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "premium_grid", about = "Write premium by plan and age to CSV")]
struct Args {
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    #[arg(long, default_value = "premium_grid.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 18)]
    min_age: u8,

    #[arg(long, default_value_t = 99)]
    max_age: u8,
}

struct GridRow {
    plan_id: String,
    age: u8,
    premium: Premium,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let (catalog, rejected) = load_catalog(&args.catalog)
        .with_context(|| format!("loading catalog from {}", args.catalog.display()))?;
    println!(
        "Loaded {} plans ({} rejected) in {:?}",
        catalog.len(),
        rejected.len(),
        start.elapsed()
    );

    let ages: Vec<u8> = (args.min_age..=args.max_age).collect();

    let rows: Vec<GridRow> = catalog
        .plans()
        .par_iter()
        .flat_map_iter(|plan| {
            ages.iter().map(move |&age| GridRow {
                plan_id: plan.id.clone(),
                age,
                premium: resolve_premium(plan, age),
            })
        })
        .collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["PlanID", "Age", "Premium", "Label"])?;

    let mut unpriceable = 0usize;
    for row in &rows {
        let amount = match row.premium.amount() {
            Some(amount) => format!("{:.2}", amount),
            None => {
                unpriceable += 1;
                String::new()
            }
        };
        let age = row.age.to_string();
        let label = row.premium.display_label();
        writer.write_record([row.plan_id.as_str(), age.as_str(), amount.as_str(), label.as_str()])?;
    }
    writer.flush()?;

    println!(
        "Wrote {} rows ({} unpriceable) to {} in {:?}",
        rows.len(),
        unpriceable,
        args.output.display(),
        start.elapsed()
    );

    Ok(())
}
