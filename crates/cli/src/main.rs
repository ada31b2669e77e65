//! `final-report` - render a final inspection report from a JSON data file

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use report::{ReportConfig, ReportData, ReportGenerator, ReportOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "final-report")]
#[command(about = "Generate a final inspection report PDF")]
#[command(version)]
struct Cli {
    /// Inspection data JSON file
    #[arg(short, long)]
    data: PathBuf,

    /// Output file name (defaults to final_report_{dong}-{ho}_{timestamp}.pdf)
    #[arg(short, long)]
    filename: Option<String>,

    /// Configuration JSON file with paths and layout overrides
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    // Logs go to stderr so stdout carries only the result JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    debug!(paths = ?config.paths, "configuration loaded");

    let json = fs::read_to_string(&cli.data)
        .with_context(|| format!("reading {}", cli.data.display()))?;
    let data: ReportData = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", cli.data.display()))?;

    let options = ReportOptions {
        filename: cli.filename,
    };
    let generated = ReportGenerator::new(config)
        .generate(&data, &options)
        .context("generating report")?;

    println!("{}", serde_json::to_string_pretty(&generated)?);
    Ok(())
}

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
