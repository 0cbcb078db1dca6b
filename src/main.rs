//! Plan Matcher CLI
//!
//! Command-line interface for ranking plans and resolving premiums

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use plan_matcher::matching::{listing_label, CoverageLevel, RoomType};
use plan_matcher::plan::{load_catalog, loader::DEFAULT_CATALOG_PATH, OptionalCover};
use plan_matcher::{EngineConfig, MatchEngine, Premium, ScoringTables, UserQuery};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "plan_matcher", version, about = "Rank insurance plans against a user query")]
struct Cli {
    /// Catalog directory holding plans.json (or plans.csv) and companies.csv
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Directory of scoring table CSVs (e.g. data/tables); built-in tables when omitted
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Fix the score perturbation seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank plans for a query
    Match {
        #[arg(long, default_value = "standard")]
        coverage: String,
        /// Budget bucket label, e.g. 40k-60k
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        age: Option<u8>,
        /// Age bracket, e.g. 65-69
        #[arg(long)]
        age_range: Option<String>,
        #[arg(long, default_value = "general")]
        room: String,
        /// Optional covers, comma separated
        #[arg(long, value_delimiter = ',')]
        covers: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
        /// Drop plans whose cheapest premium exceeds the budget ceiling
        #[arg(long)]
        prefilter: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List plans, optionally within a budget
    Plans {
        #[arg(long)]
        max_budget: Option<f64>,
    },
    /// Resolve a plan's premium at an age
    Premium {
        plan_id: String,
        age: u8,
    },
    /// Price a plan with optional covers
    Adjust {
        plan_id: String,
        #[arg(long)]
        age: Option<u8>,
        #[arg(long, value_delimiter = ',')]
        covers: Vec<String>,
    },
}

fn parse_covers(labels: &[String]) -> BTreeSet<OptionalCover> {
    labels.iter().filter_map(|label| OptionalCover::parse(label)).collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (catalog, rejected) = load_catalog(&cli.catalog)
        .with_context(|| format!("loading catalog from {}", cli.catalog.display()))?;
    if !rejected.is_empty() {
        eprintln!("Warning: {} catalog entries rejected (see log)", rejected.len());
    }

    let tables = match &cli.tables {
        Some(dir) => ScoringTables::from_csv_path(dir)
            .with_context(|| format!("loading tables from {}", dir.display()))?,
        None => ScoringTables::default_tables(),
    };

    match cli.command {
        Command::Match {
            coverage,
            budget,
            age,
            age_range,
            room,
            covers,
            limit,
            prefilter,
            json,
        } => {
            let query = UserQuery {
                desired_coverage: CoverageLevel::parse(&coverage),
                budget,
                age_range,
                age,
                room_type: RoomType::parse(&room),
                optional_covers: parse_covers(&covers),
            };
            let config = EngineConfig {
                limit,
                prefilter_budget: prefilter,
                ..Default::default()
            };
            let engine = MatchEngine::new(tables, config);
            let mut rng = match cli.seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };

            let report = engine.report(&catalog, &query, &mut rng)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if report.is_empty() {
                println!("No matching plans.");
                return Ok(());
            }

            println!("{:>4} {:<28} {:<20} {:<10} {:>7} {:>20}", "Rank", "Plan", "Company", "Tier", "Score", "Premium");
            println!("{}", "-".repeat(94));
            for entry in &report.results {
                println!(
                    "{:>4} {:<28} {:<20} {:<10} {:>7.3} {:>20}",
                    entry.rank, entry.plan_name, entry.company_name, entry.tier, entry.score, entry.premium_label
                );
            }
        }
        Command::Plans { max_budget } => {
            let engine = MatchEngine::new(tables, EngineConfig::default());
            let plans = match max_budget {
                Some(max) => engine.plans_within(&catalog, max),
                None => catalog.plans().iter().collect(),
            };
            for plan in plans {
                println!(
                    "{:<24} {:<28} {:<10} {:>20}",
                    plan.id,
                    plan.name,
                    plan.tier,
                    listing_label(plan)
                );
            }
        }
        Command::Premium { plan_id, age } => {
            let engine = MatchEngine::new(tables, EngineConfig::default());
            match engine.premium(&catalog, &plan_id, age)? {
                Premium::Amount(amount) => println!("{}: {:.2}", plan_id, amount),
                unpriceable => println!("{}: {}", plan_id, unpriceable.display_label()),
            }
        }
        Command::Adjust { plan_id, age, covers } => {
            let engine = MatchEngine::new(tables, EngineConfig::default());
            let Some(adjusted) = engine.adjust(&catalog, &plan_id, age, &parse_covers(&covers))? else {
                bail!("{} cannot be priced for the given age", plan_id);
            };
            println!("Base premium: {:.2}", adjusted.base_premium);
            for line in &adjusted.lines {
                let state = format!("{:?}", line.state);
                println!("  {:<10} {:<12} {:>12.2}", line.cover.as_str(), state, line.amount);
            }
            println!("Total premium: {:.2}", adjusted.total_premium);
        }
    }

    Ok(())
}
