//! Shipping-quote consolidation engine.
//!
//! Takes the raw, noisy list of carrier quotes returned by a rate-shopping
//! aggregator and produces the short, deduplicated, sorted and balanced list
//! shown at checkout. The engine is pure and synchronous; it never mutates
//! its input and is safe to call concurrently from independent requests.
//!
//! Stages, in pipeline order:
//! - `filter` — drops quotes without a positive, parseable price.
//! - `categorize` — splits service-point from home-delivery quotes.
//! - `dedup` — carrier-aware duplicate removal with pluggable policies.
//! - `sort` — stable ascending price order.
//! - `select` — per-category caps.
//! - `interleave` — balanced merge of the two categories.
//!
//! `consolidator` wires the stages together and `stats` carries the
//! diagnostics emitted alongside.
//!
//! ```
//! use shipquote_common::{Quote, QuotePrice};
//! use shipquote_engine::Consolidator;
//!
//! let quotes = vec![Quote {
//!     carrier_code: "colissimo".into(),
//!     product_code: "home".into(),
//!     price: Some(QuotePrice::new("8.95", "EUR")),
//!     ..Default::default()
//! }];
//! let options = Consolidator::default().consolidate(&quotes);
//! assert_eq!(options.len(), 1);
//! ```
#![warn(missing_docs)]
pub mod categorize;
pub mod consolidator;
pub mod dedup;
pub mod filter;
pub mod interleave;
pub mod select;
pub mod sort;
pub mod stats;

pub use consolidator::{Consolidation, Consolidator};
pub use dedup::{DedupPolicies, Deduplicator, DuplicatePolicy, PriceSimilarityPolicy, VariantAwarePolicy};
pub use stats::ConsolidationStats;
