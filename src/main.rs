//! Kartminer main entry point
//!
//! This is the command-line interface for the kartminer product scraper.

use anyhow::Context;
use clap::Parser;
use kartminer::config::{load_from_env, RunConfig};
use kartminer::output::{export_csv, load_stats, print_recent, print_stats};
use kartminer::pipeline::{DataPolicy, Pipeline, RunSummary};
use kartminer::session::BrowserSession;
use kartminer::storage::{open_store, ProductStore};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Default destination for the viewer's CSV save offer
const DEFAULT_EXPORT_PATH: &str = "all_products.csv";

/// Kartminer: a product-listing scraper
///
/// Kartminer drives a headless browser through paginated search-result
/// pages, extracts product listings, and stores them in a local SQLite
/// database.
#[derive(Parser, Debug)]
#[command(name = "kartminer")]
#[command(version = "1.0.0")]
#[command(about = "A product-listing scraper", long_about = None)]
struct Cli {
    /// Search keyword to scrape results for
    #[arg(long, default_value = "smartphone")]
    query: String,

    /// Clear existing products before scraping, without prompting
    #[arg(long, conflicts_with = "keep")]
    fresh: bool,

    /// Keep existing products and append, without prompting
    #[arg(long, conflicts_with = "fresh")]
    keep: bool,

    /// Show recent products and statistics instead of scraping
    #[arg(long, conflicts_with = "export")]
    view: bool,

    /// Export all products to a CSV file and exit
    #[arg(long, value_name = "PATH", conflicts_with = "view")]
    export: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Resolve configuration from the environment
    let config = load_from_env().context("failed to load configuration")?;
    tracing::debug!("Configuration: {:?}", config);

    if let Some(path) = &cli.export {
        handle_export(&config, path)
    } else if cli.view {
        handle_view(&config)
    } else {
        handle_scrape(&config, &cli)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kartminer=info,warn"),
            1 => EnvFilter::new("kartminer=debug,info"),
            2 => EnvFilter::new("kartminer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the default mode: run the extraction pipeline
fn handle_scrape(config: &RunConfig, cli: &Cli) -> anyhow::Result<()> {
    let mut store = open_store(&config.database_path)?;

    let policy = resolve_policy(&store, cli)?;

    tracing::info!(
        "Scraping {:?} from {} ({} page(s) max, policy {:?})",
        cli.query,
        config.base_url,
        config.max_pages,
        policy
    );

    let mut session =
        BrowserSession::open(config).context("could not start a browser session")?;

    match Pipeline::new(&mut session, &mut store, config).run(&cli.query, policy) {
        Ok(summary) => {
            print_run_summary(&summary);
            if let Ok(total) = store.count() {
                println!("Total products in database: {}", total);
            }
            println!("Database file: {}", config.database_path.display());
            Ok(())
        }
        Err(failure) => {
            // A summary exists when at least one page completed before
            // the abort; earlier failures print only the error
            if let Some(summary) = &failure.summary {
                print_run_summary(summary);
            }
            Err(failure.error.into())
        }
    }
}

/// Resolves the fresh-vs-keep policy, prompting only when the store
/// already holds rows and no flag decided it
fn resolve_policy(store: &dyn ProductStore, cli: &Cli) -> anyhow::Result<DataPolicy> {
    if cli.fresh {
        return Ok(DataPolicy::Fresh);
    }
    if cli.keep {
        return Ok(DataPolicy::Keep);
    }

    let existing = store.count()?;
    if existing == 0 {
        return Ok(DataPolicy::Keep);
    }

    let clear = prompt_yes_no(
        &format!(
            "Database already contains {} products. Clear them before scraping?",
            existing
        ),
        false,
    )?;

    Ok(if clear {
        DataPolicy::Fresh
    } else {
        DataPolicy::Keep
    })
}

/// Handles the --view mode: show recent products and statistics, then
/// offer a CSV export of everything
fn handle_view(config: &RunConfig) -> anyhow::Result<()> {
    let store = open_store(&config.database_path)?;

    println!("Database: {}\n", config.database_path.display());

    let stats = load_stats(&store)?;
    print_stats(&stats);

    let recent = store.fetch_recent(10)?;
    print_recent(&recent);

    if stats.total > 0 && prompt_yes_no("Save all products to CSV?", true)? {
        let path = PathBuf::from(DEFAULT_EXPORT_PATH);
        let written = export_csv(&store, &path)?;
        println!("{} products saved to {}", written, path.display());
    }

    Ok(())
}

/// Handles the --export mode: non-interactive CSV export
fn handle_export(config: &RunConfig, path: &Path) -> anyhow::Result<()> {
    let store = open_store(&config.database_path)?;

    let written = export_csv(&store, path)?;
    println!("{} products exported to {}", written, path.display());

    Ok(())
}

/// Prints the end-of-run summary
fn print_run_summary(summary: &RunSummary) {
    println!("\nScrape Summary:");
    println!("  Pages processed: {}", summary.pages_processed);
    println!("  Products extracted: {}", summary.products_extracted);
    println!("  Products skipped: {}", summary.products_skipped);
    println!("  Products stored: {}", summary.products_stored);
    println!("  Elapsed: {:.2}s", summary.elapsed.as_secs_f64());
}

/// Asks a yes/no question on stdin, returning `default` on empty input
fn prompt_yes_no(question: &str, default: bool) -> std::io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    print!("{} [{}] ", question, hint);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    Ok(match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    })
}
