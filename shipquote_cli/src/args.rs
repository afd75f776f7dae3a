//! Command-line arguments for the consolidation CLI.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use shipquote_common::ConsolidationConfig;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to a JSON quote batch (a list of quotes or `{ "quotes": [...] }`).
    /// Repeat to consolidate several batches concurrently.
    #[clap(long = "input", short = 'i', required = true)]
    pub inputs: Vec<String>,

    /// Path to a JSON consolidation config. Missing keys keep their defaults.
    #[clap(long)]
    pub config: Option<String>,

    /// Maximum number of service-point options.
    #[clap(long)]
    pub max_service_points: Option<usize>,

    /// Maximum number of home-delivery options.
    #[clap(long)]
    pub max_home_delivery: Option<usize>,

    /// Hard cap on the final list.
    #[clap(long)]
    pub max_total: Option<usize>,

    /// Price difference below which two quotes of an ordinary carrier are duplicates.
    #[clap(long)]
    pub threshold: Option<f64>,

    /// Carrier code deduplicated with the variant-aware policy. May be repeated.
    #[clap(long = "variant-carrier")]
    pub variant_carriers: Vec<String>,

    /// Service-point options shown before each home-delivery option.
    #[clap(long)]
    pub interleave_ratio: Option<usize>,

    /// Include consolidation stats in the output.
    #[clap(long)]
    pub stats: bool,

    /// Pretty-print the JSON output.
    #[clap(long)]
    pub pretty: bool,
}

impl Args {
    /// Apply flag overrides on top of a base configuration.
    pub fn apply_overrides(&self, mut config: ConsolidationConfig) -> ConsolidationConfig {
        if let Some(max) = self.max_service_points {
            config.max_service_points = max;
        }
        if let Some(max) = self.max_home_delivery {
            config.max_home_delivery = max;
        }
        if let Some(max) = self.max_total {
            config.max_total_options = max;
        }
        if let Some(threshold) = self.threshold {
            config.price_similarity_threshold = threshold;
        }
        if let Some(ratio) = self.interleave_ratio {
            config.interleave_ratio = ratio;
        }
        for carrier in &self.variant_carriers {
            config = config.with_variant_prone_carrier(carrier);
        }
        config
    }
}
