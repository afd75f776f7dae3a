//! Concurrent consolidation of quote batch files.
//!
//! Each input file is read, parsed, and consolidated on its own thread. Results
//! are sent back over a `crossbeam_channel` tagged with the input index so the
//! caller can report them in the order the files were given. A broken file
//! only fails its own batch.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, info};
use serde::Serialize;
use shipquote_common::{Quote, QuoteBatchParser, QuoteError, Result};
use shipquote_engine::{ConsolidationStats, Consolidator};

/// Consolidated options for one input batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Name of the input (usually the file path).
    pub input: String,
    /// Ordered shipping options for display.
    pub options: Vec<Quote>,
    /// Items in the input that could not be read as quotes.
    pub skipped: usize,
    /// Run diagnostics, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ConsolidationStats>,
}

/// Parse a batch from `reader` and consolidate it.
pub fn consolidate_reader<R: Read>(
    engine: &Consolidator,
    input: &str,
    reader: R,
    with_stats: bool,
) -> Result<BatchReport> {
    let batch = Quote::read_batch(reader)?;
    debug!(
        "Parsed {} quotes from {} ({} skipped)",
        batch.quotes.len(),
        input,
        batch.skipped
    );
    let consolidation = engine.consolidate_with_stats(&batch.quotes);
    Ok(BatchReport {
        input: input.to_string(),
        options: consolidation.options.into_iter().cloned().collect(),
        skipped: batch.skipped,
        stats: with_stats.then_some(consolidation.stats),
    })
}

/// Open a batch file and consolidate it.
pub fn consolidate_file(engine: &Consolidator, path: &Path, with_stats: bool) -> Result<BatchReport> {
    if !is_file_exist(path) {
        return Err(QuoteError::Format(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    let file = File::open(path)?;
    consolidate_reader(
        engine,
        &path.display().to_string(),
        BufReader::new(file),
        with_stats,
    )
}

/// Consolidate every file on its own thread and return results in input order.
///
/// The outer `Result` only fails if a worker disappears without reporting.
pub fn run_batches(
    engine: Arc<Consolidator>,
    paths: Vec<PathBuf>,
    with_stats: bool,
) -> Result<Vec<(PathBuf, Result<BatchReport>)>> {
    let (result_tx, result_rx) = unbounded::<(usize, Result<BatchReport>)>();
    let total = paths.len();

    for (index, path) in paths.iter().cloned().enumerate() {
        let engine = Arc::clone(&engine);
        let result_tx = result_tx.clone();
        thread::spawn(move || {
            let result = consolidate_file(&engine, &path, with_stats);
            if let Err(e) = result_tx.send((index, result)) {
                debug!("Result for {} dropped: {}", path.display(), e);
            }
        });
    }
    drop(result_tx);
    info!("Consolidating {} batch(es)", total);

    let mut slots: Vec<Option<Result<BatchReport>>> = (0..total).map(|_| None).collect();
    for _ in 0..total {
        let (index, result) = result_rx
            .recv()
            .map_err(|e| QuoteError::ChannelRecv(e.to_string()))?;
        slots[index] = Some(result);
    }

    paths
        .into_iter()
        .zip(slots)
        .map(|(path, slot)| {
            let result = slot.ok_or_else(|| {
                QuoteError::ChannelRecv(format!("no result for {}", path.display()))
            })?;
            Ok((path, result))
        })
        .collect()
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
pub fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
