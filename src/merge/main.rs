//! Administrative hierarchy merge.
//!
//! Reads the nationwide, per-province and per-city boundary documents,
//! writes the merged province/city/county tree and a summary report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use admerge::source::{DirectoryLayout, DirectorySource};
use admerge::{Edition, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "merge")]
#[command(about = "Merge province, city and county boundaries into one hierarchy")]
struct Args {
    /// Base directory of the input documents
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Nationwide document, relative to the data directory
    #[arg(long, default_value = "china.json")]
    root_file: PathBuf,

    /// Directory of per-province city documents
    #[arg(long, default_value = "geometryProvince")]
    province_dir: PathBuf,

    /// Directory of per-city county documents
    #[arg(long, default_value = "geometryCouties")]
    county_dir: PathBuf,

    /// Merged hierarchy output
    #[arg(short, long, default_value = "china_administrative_hierarchy.json")]
    output: PathBuf,

    /// Summary report output
    #[arg(long, default_value = "administrative_report.json")]
    report: PathBuf,

    /// TOML edition file (defaults to the built-in China table)
    #[arg(long)]
    edition: Option<PathBuf>,

    /// Only merge these provinces (code, full name or short name)
    #[arg(long)]
    only: Vec<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("Administrative hierarchy merge");
    info!("Data directory: {}", args.data_dir.display());

    let mut edition = match &args.edition {
        Some(path) => Edition::load_from_file(path)
            .with_context(|| format!("Failed to load edition {}", path.display()))?,
        None => Edition::china(),
    };
    if !args.only.is_empty() {
        edition = edition
            .restrict_to(&args.only)
            .context("Invalid --only selection")?;
    }
    info!(
        "Edition: {} ({} provinces)",
        edition.name(),
        edition.provinces().len()
    );

    let layout = DirectoryLayout {
        root_file: args.root_file,
        province_dir: args.province_dir,
        county_dir: args.county_dir,
    };
    let source = DirectorySource::new(&args.data_dir, &layout);

    let mut pipeline = Pipeline::new(&edition, &source, args.output, args.report);
    if !args.no_progress {
        let pb = ProgressBar::new(edition.provinces().len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} provinces")?
                .progress_chars("#>-"),
        );
        pipeline = pipeline.with_progress(pb);
    }

    match pipeline.run() {
        Ok(summary) => {
            info!(
                "Validation: {} errors, {} warnings",
                summary.validation.errors.len(),
                summary.validation.warnings.len()
            );
            if summary.validation.has_errors() {
                warn!("Merged hierarchy has structural errors, see log above");
            }
            info!("Output: {}", summary.output_path.display());
            match &summary.report_error {
                Some(e) => warn!("Report missing: {}", e),
                None => info!("Report: {}", summary.report_path.display()),
            }
            Ok(ExitCode::SUCCESS)
        }
        // Already logged by the pipeline.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}
