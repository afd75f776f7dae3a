//! Error types shared by the engine and its hosts.
//!
//! The `QuoteError` enum unifies the failure cases that can occur around the
//! consolidation engine: reading quote batches and configuration files,
//! decoding JSON, rejecting an invalid configuration, and moving results
//! between worker threads. Consolidation itself never fails on bad quote data.
use std::io;

use thiserror::Error;

/// Unified error type shared across the workspace.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from the standard library (files, stdout).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A consolidation setting is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),
}
