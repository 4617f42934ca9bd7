//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{ListingFilter, PriceSort, ZoneSort};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ACN Insights - agent, enquiry and property snapshot analytics
///
/// Joins the exported agents, enquiries and properties, then reports
/// per-agent price statistics, zone distributions and the primary zone
/// of every FSM token holder.
///
/// Examples:
///   acn-insights categorize
///   acn-insights --data-dir ./exports prices --listing rental --format json
///   acn-insights zones --fsm-only --sort inventories
///   acn-insights counts --format json
///   acn-insights init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding agents.json, enquiries.json and properties.json
    #[arg(
        short,
        long,
        global = true,
        value_name = "DIR",
        env = "ACN_INSIGHTS_DATA_DIR"
    )]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .acn-insights.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locale qualifier appended to zone labels (e.g. "Bangalore")
    #[arg(long, global = true, value_name = "TEXT")]
    pub qualifier: Option<String>,

    /// Do not retry unknown inventory ids as property qcIds
    #[arg(long, global = true)]
    pub no_qc_fallback: bool,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assign every FSM token holder to one primary zone
    Categorize(CategorizeArgs),
    /// Per-agent resale and rental price statistics
    Prices(PricesArgs),
    /// Per-agent zone distribution of linked properties
    Zones(ZonesArgs),
    /// Property counts in the database versus properties used by agents
    Counts(SummaryArgs),
    /// Break rental properties down by rent availability
    Rentals(RentalsArgs),
    /// Generate a default .acn-insights.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CategorizeArgs {
    /// Directory for the per-zone id files and summary.json
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the summary only, without writing files
    #[arg(long)]
    pub no_files: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PricesArgs {
    /// Output format (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only include agents holding an FSM token
    #[arg(long)]
    pub fsm_only: bool,

    /// Only include agents with priced listings of this type
    #[arg(long, default_value = "all", value_name = "TYPE")]
    pub listing: ListingFilter,

    /// Ordering within each listing group
    #[arg(long, default_value = "avg-price", value_name = "KEY")]
    pub sort: PriceSort,

    /// Case-insensitive match on agent name or id
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ZonesArgs {
    /// Output format (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only include agents holding an FSM token
    #[arg(long)]
    pub fsm_only: bool,

    /// Row ordering
    #[arg(long, default_value = "enquiries", value_name = "KEY")]
    pub sort: ZoneSort,

    /// Case-insensitive match on agent name or id
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

/// Output options of the dataset-wide summaries.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SummaryArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: SummaryFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RentalsArgs {
    /// Example property ids to show per category
    #[arg(long, value_name = "COUNT")]
    pub examples: Option<usize>,

    #[command(flatten)]
    pub summary: SummaryArgs,
}

/// Output format for the price and zone reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Console table (default)
    #[default]
    Text,
    /// Markdown document
    Markdown,
    /// JSON document
    Json,
}

/// Output format for the counts and rentals summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryFormat {
    /// Console report (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Init-config never touches the data directory
        if matches!(self.command, Command::InitConfig) {
            return Ok(());
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.exists() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Data path is not a directory: {}", dir.display()));
            }
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file not found: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
