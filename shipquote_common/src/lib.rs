//!
//! Common types shared by the shipping-quote consolidation engine and its hosts.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `last_mile` — the `LastMileType` of a quote (pickup point or door delivery).
//! - `quote` — the carrier `Quote` record, its price and batch parsing helpers.
//! - `config` — `ConsolidationConfig` with its defaults and validation.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod last_mile;
pub mod quote;
pub mod result;

pub use config::ConsolidationConfig;
pub use error::QuoteError;
pub use last_mile::LastMileType;
pub use quote::{Quote, QuoteBatch, QuoteBatchParser, QuotePrice};
pub use result::Result;
