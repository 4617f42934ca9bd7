//! ACN Insights - agent, enquiry and property snapshot analytics
//!
//! A CLI tool that joins exported agent, enquiry and property snapshots
//! and reports per-agent price statistics, zone distributions and the
//! primary zone of every FSM token holder.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (invalid arguments, config, malformed snapshot, write failure)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod snapshot;

use analysis::{AgentQuery, Linker, PriceOverview, ZoneLabels};
use anyhow::{Context, Result};
use cli::{Args, Command, OutputFormat, PricesArgs, SummaryArgs, SummaryFormat, ZonesArgs};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use snapshot::{Snapshot, SnapshotPaths};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("ACN Insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .acn-insights.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize data paths, zone labels and report output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load the snapshot and dispatch the selected command.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let paths = SnapshotPaths::from(&config.data);
    let (snapshot, stats) = Snapshot::load(&paths).await?;
    debug!("Load stats: {:?}", stats);

    let linker = Linker::new(&snapshot, &config.linker);
    let labels = ZoneLabels::from(&config.zones);

    match &args.command {
        Command::Categorize(_) => run_categorize(&linker, &labels, &config, args.quiet),
        Command::Prices(cmd) => run_prices(&linker, cmd),
        Command::Zones(cmd) => run_zones(&linker, &labels, cmd),
        Command::Counts(cmd) => {
            let coverage = analysis::analyze_coverage(&linker);
            write_summary(cmd, &coverage, report::render_coverage)
        }
        Command::Rentals(cmd) => {
            let rentals = analysis::analyze_rentals(&linker, config.report.example_limit);
            write_summary(&cmd.summary, &rentals, report::render_rentals)
        }
        // Handled before logging is set up
        Command::InitConfig => Ok(()),
    }
}

fn run_categorize(
    linker: &Linker<'_>,
    labels: &ZoneLabels,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} agents",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let categorization = analysis::categorize_agents(linker, &progress);
    progress.finish_and_clear();

    let files_dir = if config.report.write_zone_files {
        let dir = PathBuf::from(&config.report.output_dir);
        let written = report::write_categorization(&dir, &categorization, labels)?;
        info!("Wrote {} files to {}", written.len(), dir.display());
        Some(dir)
    } else {
        None
    };

    print!(
        "{}",
        report::render_categorization(
            &categorization,
            labels,
            files_dir.as_deref(),
            config.report.preview_limit
        )
    );
    Ok(())
}

fn run_prices(linker: &Linker<'_>, cmd: &PricesArgs) -> Result<()> {
    let prices = analysis::analyze_prices(linker);
    if prices.diagnostics.unresolved() > 0 {
        info!(
            "{} agent references did not resolve to a property",
            prices.diagnostics.unresolved()
        );
    }

    let query = AgentQuery {
        search: cmd.search.clone(),
        fsm_only: cmd.fsm_only,
    };
    let rows = analysis::select_price_rows(&prices.agents, &query, cmd.listing, cmd.sort);
    let overview = PriceOverview::new(&prices, &rows);

    let content = match cmd.format {
        OutputFormat::Text => report::render_price_table(&overview, &rows, cmd.listing),
        OutputFormat::Markdown => report::generate_price_markdown(&overview, &rows),
        OutputFormat::Json => report::generate_price_json(&overview, &rows)?,
    };

    report::write_report(&content, cmd.output.as_deref())
}

fn run_zones(linker: &Linker<'_>, labels: &ZoneLabels, cmd: &ZonesArgs) -> Result<()> {
    let agents = analysis::analyze_zones(linker, labels);

    let query = AgentQuery {
        search: cmd.search.clone(),
        fsm_only: cmd.fsm_only,
    };
    let rows = analysis::select_zone_rows(&agents, &query, cmd.sort);

    let content = match cmd.format {
        OutputFormat::Text => report::render_zone_table(&rows),
        OutputFormat::Markdown => report::generate_zone_markdown(&rows),
        OutputFormat::Json => report::generate_zone_json(&rows)?,
    };

    report::write_report(&content, cmd.output.as_deref())
}

/// Write a dataset-wide summary as console text or JSON.
fn write_summary<T: serde::Serialize>(
    cmd: &SummaryArgs,
    summary: &T,
    render: fn(&T) -> String,
) -> Result<()> {
    let content = match cmd.format {
        SummaryFormat::Text => render(summary),
        SummaryFormat::Json => report::generate_summary_json(summary)?,
    };

    report::write_report(&content, cmd.output.as_deref())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
