use std::fmt::Display;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocket_miner::catalog::Catalog;
use rocket_miner::config::MinerConfig;
use rocket_miner::db::Database;
use rocket_miner::mining::RocketMiner;
use rocket_miner::render;
use rocket_miner::repository::Repository;

#[derive(Parser)]
#[command(name = "rminer")]
#[command(about = "Rank and aggregate a catalog of rocket launches")]
struct Cli {
    /// SQLite catalog to use (overrides the config file and ROCKET_MINER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Query a JSON catalog file directly instead of the database
    #[arg(long, global = true, conflicts_with = "db")]
    catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration, saving any values given
    Config {
        /// Database to use when --db is not given
        #[arg(long)]
        database: Option<PathBuf>,

        /// Log filter to use when RUST_LOG is unset
        #[arg(long)]
        log_filter: Option<String>,

        /// k for ranking commands run without -k
        #[arg(long)]
        default_k: Option<i64>,
    },
    /// Load a JSON catalog into the database
    Import {
        /// Catalog file to read
        file: PathBuf,
    },
    /// Rockets with the most successful launches
    MostLaunchedRockets {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Providers with the highest share of successful launches
    MostReliableProviders {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Providers with the highest share of failed launches
    LeastReliableProviders {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Latest launches
    MostRecentLaunches {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Latest failed launches
    MostRecentFailedLaunches {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Highest priced launches
    MostExpensiveLaunches {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Cheapest successful launches
    MostAffordableLaunches {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Highest priced failed launches
    MostExpensiveFailedLaunches {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,
    },
    /// Providers with the highest summed launch price in a year
    HighestRevenueProviders {
        #[arg(short, allow_negative_numbers = true)]
        k: Option<i64>,

        /// Calendar year to sum
        #[arg(long)]
        year: i32,
    },
    /// Country with the most successful launches to an orbit
    DominantCountry {
        /// Orbit name, matched exactly (e.g. "Low Earth Orbit")
        orbit: String,
    },
}

/// Initialize tracing on stderr so stdout carries only results.
fn init_tracing(configured: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .ok()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| "rocket_miner=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(cli_path: Option<PathBuf>, config: &MinerConfig) -> anyhow::Result<Database> {
    let db = match cli_path.or_else(|| config.database_path()) {
        Some(path) => Database::open(path.clone())
            .with_context(|| format!("Failed to open database {}", path.display()))?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn print_ranking<T: Display + Serialize>(title: &str, items: &[T], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        print!("{}", render::render_ranking(title, items));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = MinerConfig::load();
    init_tracing(
        loaded
            .as_ref()
            .ok()
            .and_then(|config| config.log_filter.as_deref()),
    );
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {:#}", e);
        MinerConfig::default()
    });

    if let Commands::Config {
        database,
        log_filter,
        default_k,
    } = &cli.command
    {
        let mut config = config;
        let changed = database.is_some() || log_filter.is_some() || default_k.is_some();
        if let Some(path) = database {
            config.database_path = Some(path.clone());
        }
        if let Some(filter) = log_filter {
            config.log_filter = Some(filter.clone());
        }
        if let Some(k) = default_k {
            config.default_k = *k;
        }
        if changed {
            let path = config.save()?;
            tracing::info!("Saved config to {}", path.display());
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Commands::Import { file } = &cli.command {
        let snapshot = Catalog::load(file)?.build()?;
        let db = open_database(cli.db, &config)?;
        let summary = db.import(&snapshot)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!(
                "Imported {} providers, {} rockets, {} launches, {} payloads, {} users",
                summary.providers, summary.rockets, summary.launches, summary.payloads, summary.users
            );
        }
        return Ok(());
    }

    let repository: Box<dyn Repository> = match &cli.catalog {
        Some(path) => Box::new(Catalog::load(path)?.build()?),
        None => Box::new(open_database(cli.db.clone(), &config)?),
    };
    let miner = RocketMiner::new(repository);
    let json = cli.json;
    let default_k = config.default_k;

    match cli.command {
        Commands::Config { .. } | Commands::Import { .. } => {}
        Commands::MostLaunchedRockets { k } => {
            let rockets = miner.most_launched_rockets(k.unwrap_or(default_k))?;
            print_ranking("Most launched rockets", &rockets, json)?;
        }
        Commands::MostReliableProviders { k } => {
            let providers = miner.most_reliable_launch_service_providers(k.unwrap_or(default_k))?;
            print_ranking("Most reliable launch service providers", &providers, json)?;
        }
        Commands::LeastReliableProviders { k } => {
            let providers = miner.least_reliable_launch_service_providers(k.unwrap_or(default_k))?;
            print_ranking("Least reliable launch service providers", &providers, json)?;
        }
        Commands::MostRecentLaunches { k } => {
            let launches = miner.most_recent_launches(k.unwrap_or(default_k))?;
            print_ranking("Most recent launches", &launches, json)?;
        }
        Commands::MostRecentFailedLaunches { k } => {
            let launches = miner.most_recent_failed_launches(k.unwrap_or(default_k))?;
            print_ranking("Most recent failed launches", &launches, json)?;
        }
        Commands::MostExpensiveLaunches { k } => {
            let launches = miner.most_expensive_launches(k.unwrap_or(default_k))?;
            print_ranking("Most expensive launches", &launches, json)?;
        }
        Commands::MostAffordableLaunches { k } => {
            let launches = miner.most_affordable_launches(k.unwrap_or(default_k))?;
            print_ranking("Most affordable launches", &launches, json)?;
        }
        Commands::MostExpensiveFailedLaunches { k } => {
            let launches = miner.most_expensive_failed_launches(k.unwrap_or(default_k))?;
            print_ranking("Most expensive failed launches", &launches, json)?;
        }
        Commands::HighestRevenueProviders { k, year } => {
            let providers =
                miner.highest_revenue_launch_service_providers(k.unwrap_or(default_k), year)?;
            print_ranking(
                &format!("Highest revenue launch service providers in {}", year),
                &providers,
                json,
            )?;
        }
        Commands::DominantCountry { orbit } => {
            let country = miner.dominant_country(&orbit)?;
            if json {
                println!("{}", serde_json::json!({ "orbit": orbit, "country": country }));
            } else {
                print!("{}", render::render_answer(&format!("Dominant country in {}", orbit), &country));
            }
        }
    }

    Ok(())
}
