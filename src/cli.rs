//! Command-line interface definitions for Stay Scout.

use clap::Parser;
use stay_scout::export::{ExportFormat, DEFAULT_OUTPUT_DIR};
use std::path::PathBuf;

/// Scrape short-term rental listings for a set of cities.
///
/// # Examples
///
/// ```sh
/// # Two cities, plain HTTP only
/// stay-scout --city "Austin, TX" --city "Denver, CO" --no-browser
///
/// # Every configured city, CSV only
/// stay-scout --all --format csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// City to scrape, e.g. "Austin, TX" (repeatable)
    #[arg(long = "city", value_name = "CITY")]
    pub cities: Vec<String>,

    /// Scrape every city in the configuration
    #[arg(long, conflicts_with = "cities")]
    pub all: bool,

    /// Maximum listings per city
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Skip Chrome and fetch pages over plain HTTP
    #[arg(long)]
    pub no_browser: bool,

    /// Show the Chrome window instead of running headless
    #[arg(long)]
    pub headful: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "both")]
    pub format: ExportFormat,

    /// Directory for timestamped output files
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Explicit output path without extension; overrides --output-dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
