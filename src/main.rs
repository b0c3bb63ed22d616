use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use wealth_atlas::analysis::{compare, compare_regions, correlate, region_trend, summarize};
use wealth_atlas::config::{self, Config};
use wealth_atlas::continent::cache::{clear_cache, get_cache_path};
use wealth_atlas::continent::{CacheConfig, ContinentLabel, RegionalDataset, ResolutionReport};
use wealth_atlas::dataset::{save_regional_dataset, Indicator};
use wealth_atlas::error::{CorrelationError, DatasetError, InsightError, ScoreUnavailable};
use wealth_atlas::output;
use wealth_atlas::pipeline::{self, ClassifierUnreachable};
use wealth_atlas::scoring::ProgressScorer;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_DATA: i32 = 5;
const EXIT_UNAVAILABLE: i32 = 6;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag every row with its continent and report what was dropped
    Clean {
        /// Write the cleaned table (with a Region column) to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Progress score breakdown for one country
    Score {
        country: String,
        /// Year to score (defaults to the latest year in the dataset)
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Score two countries and report the leader
    Compare {
        first: String,
        second: String,
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Per-continent indicator averages
    Summary {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Pearson correlation between two indicators (gdp, life, health, mortality)
    Correlate {
        #[arg(value_parser = Indicator::parse)]
        x: Indicator,
        #[arg(value_parser = Indicator::parse)]
        y: Indicator,
        #[arg(short, long)]
        year: Option<i32>,
        /// Restrict to one continent, e.g. "South America"
        #[arg(short, long)]
        region: Option<ContinentLabel>,
    },
    /// Latest continent average of one indicator for two continents
    CompareRegions {
        #[arg(value_parser = Indicator::parse)]
        indicator: Indicator,
        first: ContinentLabel,
        second: ContinentLabel,
    },
    /// How one continent's average of an indicator moved from the first year to the last
    Trend {
        #[arg(value_parser = Indicator::parse)]
        indicator: Indicator,
        region: ContinentLabel,
    },
    /// Create a config file
    Init {
        /// Write the defaults without prompting
        #[arg(long)]
        defaults: bool,
    },
    /// Delete cached classifier answers
    ClearCache,
}

#[derive(Parser, Debug)]
#[command(name = "wealth-atlas")]
#[command(about = "Continent tagging and progress scoring for World Bank indicators", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/wealth-atlas/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Indicator CSV (overrides `dataset` in the config)
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Skip the on-disk classifier cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Emit JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    if verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL);
    }
    pretty_env_logger::init_timed();
}

/// Map a failure to the documented exit code
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<ClassifierUnreachable>().is_some() {
        EXIT_NETWORK
    } else if error.downcast_ref::<DatasetError>().is_some() {
        EXIT_DATA
    } else if error.downcast_ref::<ScoreUnavailable>().is_some()
        || error.downcast_ref::<CorrelationError>().is_some()
        || error.downcast_ref::<InsightError>().is_some()
    {
        EXIT_UNAVAILABLE
    } else {
        EXIT_FAILURE
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() {
    wealth_atlas::install_crypto_provider();

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();

    let cache_config = CacheConfig {
        enabled: !cli.no_cache,
        path: get_cache_path(),
    };
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Commands that do not need a valid config
    match &cli.command {
        Commands::Init { defaults } => {
            if let Err(e) = config::run_init_wizard(config_path, *defaults) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::ClearCache => {
            if let Err(e) = clear_cache(&cache_config.path) {
                eprintln!("Failed to clear cache: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
            println!("Cache cleared ({})", cache_config.path.display());
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate the whole config at startup
    if let Err(errors) = config.validate() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let code = match run(&cli, &config, &cache_config).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };

    debug!("Finished in {:?}", start_time.elapsed());
    std::process::exit(code);
}

async fn run(cli: &Cli, config: &Config, cache_config: &CacheConfig) -> Result<()> {
    let dataset_path = match pipeline::dataset_path(cli.dataset.as_deref(), config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let resolver = match pipeline::build_resolver(config, cache_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to set up continent resolver: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let (tagged, report) = pipeline::load_and_tag(&dataset_path, &resolver).await?;
    let stats = resolver.cache().stats();
    debug!(
        "Resolution cache: {} entries, {} hits, {} misses",
        stats.entries, stats.hits, stats.misses
    );

    let use_colors = output::should_use_colors();

    match &cli.command {
        Commands::Clean { output: out_path } => {
            run_clean(&tagged, &report, out_path.as_ref(), cli.json, use_colors)
        }
        Commands::Score { country, year } => {
            let year = resolve_year(*year, &tagged)?;
            let scorer = ProgressScorer::new(tagged.rows(), config.scoring.weights);
            let breakdown = scorer.score(country, year)?;
            if cli.json {
                print_json(&breakdown)
            } else {
                println!("{}", output::format_breakdown(&breakdown, use_colors));
                Ok(())
            }
        }
        Commands::Compare {
            first,
            second,
            year,
        } => {
            let year = resolve_year(*year, &tagged)?;
            let scorer = ProgressScorer::new(tagged.rows(), config.scoring.weights);
            let comparison = compare(&scorer, first, second, year)?;
            if cli.json {
                print_json(&comparison)
            } else {
                println!("{}", output::format_comparison(&comparison, use_colors));
                Ok(())
            }
        }
        Commands::Summary { year } => {
            let table = summarize(&tagged, *year)
                .context("No rows left after continent tagging")?;
            if cli.json {
                print_json(&table)
            } else {
                println!("{}", output::format_summary_table(&table, use_colors));
                Ok(())
            }
        }
        Commands::Correlate { x, y, year, region } => {
            let year = resolve_year(*year, &tagged)?;
            let insight = correlate(&tagged, *x, *y, year, *region)?;
            if cli.json {
                print_json(&insight)
            } else {
                println!("{}", output::format_correlation(&insight, use_colors));
                Ok(())
            }
        }
        Commands::CompareRegions {
            indicator,
            first,
            second,
        } => {
            let comparison = compare_regions(&tagged, *indicator, *first, *second)?;
            if cli.json {
                print_json(&comparison)
            } else {
                println!("{}", output::format_region_comparison(&comparison, use_colors));
                Ok(())
            }
        }
        Commands::Trend { indicator, region } => {
            let trend = region_trend(&tagged, *region, *indicator)?;
            if cli.json {
                print_json(&trend)
            } else {
                println!("{}", output::format_trend(&trend, use_colors));
                Ok(())
            }
        }
        Commands::Init { .. } | Commands::ClearCache => Ok(()),
    }
}

fn run_clean(
    tagged: &RegionalDataset,
    report: &ResolutionReport,
    out_path: Option<&PathBuf>,
    json: bool,
    use_colors: bool,
) -> Result<()> {
    if let Some(path) = out_path {
        save_regional_dataset(path, tagged)?;
    }

    if json {
        print_json(&tagged.rows())?;
    } else {
        println!("{}", output::format_clean_report(report, use_colors));
        if let Some(path) = out_path {
            println!("Cleaned table written to {}", path.display());
        }
    }
    Ok(())
}

/// Requested year, or the latest year in the tagged dataset
fn resolve_year(year: Option<i32>, tagged: &RegionalDataset) -> Result<i32> {
    match year {
        Some(y) => Ok(y),
        None => tagged
            .latest_year()
            .context("No rows left after continent tagging"),
    }
}
