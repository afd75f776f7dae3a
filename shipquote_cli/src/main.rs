//! Shipquote CLI — consolidates raw carrier quote batches into the short list
//! shown at checkout and prints it as JSON. Each `--input` file holds the quotes
//! a rate-shopping aggregator returned for one shipment; batches are processed
//! concurrently and reported in the order given.
//!
//! Usage example (CLI):
//! ```bash
//! shipquote_cli --input ./checkout_quotes.json --config ./consolidation.json --stats --pretty
//! ```
//!
//! Flags such as `--max-service-points` or `--variant-carrier` override values
//! from the config file. Set `RUST_LOG=debug` to see which quotes were dropped
//! and why.
#![warn(missing_docs)]
mod args;
mod runner;

use crate::args::Args;
use crate::runner::{BatchReport, normalize_path, run_batches};
use clap::Parser;
use log::{error, info};
use shipquote_common::ConsolidationConfig;
use shipquote_common::QuoteError;
use shipquote_common::Result;
use shipquote_engine::Consolidator;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();

    let config = args.apply_overrides(load_config(args.config.as_deref())?);
    let engine = Arc::new(Consolidator::new(config)?);
    info!("Consolidation config: {:?}", engine.config());
    info!("Duplicate policies: {:?}", engine.policies());

    let paths: Vec<PathBuf> = args.inputs.iter().map(|raw| normalize_path(raw)).collect();
    let total = paths.len();
    let mut reports = Vec::with_capacity(total);
    for (path, result) in run_batches(engine, paths, args.stats)? {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => error!("Batch {} failed: {}", path.display(), e),
        }
    }

    print_reports(&reports, args.pretty)?;

    let failed = total - reports.len();
    if failed > 0 {
        return Err(QuoteError::Format(format!(
            "{} of {} batches failed",
            failed, total
        )));
    }
    Ok(())
}

/// Load the config file if one was given, otherwise start from defaults.
fn load_config(path: Option<&str>) -> Result<ConsolidationConfig> {
    match path {
        Some(raw) => {
            let path = normalize_path(raw);
            let file = File::open(&path).map_err(|e| {
                QuoteError::Format(format!("Failed to open config {}: {}", path.display(), e))
            })?;
            ConsolidationConfig::from_reader(BufReader::new(file))
        }
        None => Ok(ConsolidationConfig::default()),
    }
}

/// Print one report as an object, several as an array.
fn print_reports(reports: &[BatchReport], pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match (reports, pretty) {
        ([single], true) => serde_json::to_writer_pretty(&mut out, single)?,
        ([single], false) => serde_json::to_writer(&mut out, single)?,
        (many, true) => serde_json::to_writer_pretty(&mut out, many)?,
        (many, false) => serde_json::to_writer(&mut out, many)?,
    }
    writeln!(out)?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}
