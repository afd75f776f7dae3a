//! Consolidation settings and their defaults.
//!
//! Every setting has a default matching what a checkout page shows today:
//! at most four pickup-point options and six door-delivery options, ten in
//! total, with UPS treated as a carrier that emits distinct variants at the
//! same carrier+product+price. Hosts may load overrides from JSON; missing
//! keys keep their defaults.

use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Default cap on service-point quotes in the final list.
pub const DEFAULT_MAX_SERVICE_POINTS: usize = 4;
/// Default cap on home-delivery quotes in the final list.
pub const DEFAULT_MAX_HOME_DELIVERY: usize = 6;
/// Default hard cap on the final list.
pub const DEFAULT_MAX_TOTAL_OPTIONS: usize = 10;
/// Default price difference below which two quotes count as the same price.
pub const DEFAULT_PRICE_SIMILARITY_THRESHOLD: f64 = 0.01;
/// Default number of service-point quotes emitted before each home-delivery quote.
pub const DEFAULT_INTERLEAVE_RATIO: usize = 2;
/// Carriers known to return structurally distinct offers at identical prices.
pub const DEFAULT_VARIANT_PRONE_CARRIERS: &[&str] = &["ups"];

/// Tunable limits and policies of the consolidation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsolidationConfig {
    /// Maximum number of service-point quotes kept.
    pub max_service_points: usize,
    /// Maximum number of home-delivery quotes kept.
    pub max_home_delivery: usize,
    /// Final hard truncation applied after interleaving.
    pub max_total_options: usize,
    /// Prices closer than this are considered equal when deduplicating.
    pub price_similarity_threshold: f64,
    /// Lowercase carrier codes deduplicated with the variant-aware policy.
    pub variant_prone_carriers: BTreeSet<String>,
    /// Service-point quotes emitted between two home-delivery quotes.
    pub interleave_ratio: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        ConsolidationConfig {
            max_service_points: DEFAULT_MAX_SERVICE_POINTS,
            max_home_delivery: DEFAULT_MAX_HOME_DELIVERY,
            max_total_options: DEFAULT_MAX_TOTAL_OPTIONS,
            price_similarity_threshold: DEFAULT_PRICE_SIMILARITY_THRESHOLD,
            variant_prone_carriers: DEFAULT_VARIANT_PRONE_CARRIERS
                .iter()
                .map(|code| code.to_string())
                .collect(),
            interleave_ratio: DEFAULT_INTERLEAVE_RATIO,
        }
    }
}

impl ConsolidationConfig {
    /// Load a configuration from JSON, normalise it, and validate it.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, QuoteError> {
        let config: ConsolidationConfig = serde_json::from_reader(reader)?;
        config.normalized().validated()
    }

    /// Add a carrier to the variant-prone set.
    pub fn with_variant_prone_carrier(mut self, carrier_code: &str) -> Self {
        self.variant_prone_carriers
            .insert(carrier_code.trim().to_ascii_lowercase());
        self
    }

    /// Lowercase and trim carrier codes, dropping empty entries.
    pub fn normalized(mut self) -> Self {
        self.variant_prone_carriers = self
            .variant_prone_carriers
            .iter()
            .map(|code| code.trim().to_ascii_lowercase())
            .filter(|code| !code.is_empty())
            .collect();
        self
    }

    /// Check that every setting is within its allowed range.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.interleave_ratio == 0 {
            return Err(QuoteError::InvalidConfig(
                "interleaveRatio must be at least 1".to_string(),
            ));
        }
        let threshold = self.price_similarity_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(QuoteError::InvalidConfig(format!(
                "priceSimilarityThreshold must be a finite non-negative number, got {}",
                threshold
            )));
        }
        Ok(())
    }

    /// Consume the config, returning it if [`Self::validate`] passes.
    pub fn validated(self) -> Result<Self, QuoteError> {
        self.validate()?;
        Ok(self)
    }

    /// Whether the carrier uses the variant-aware duplicate test.
    pub fn is_variant_prone(&self, carrier_code: &str) -> bool {
        self.variant_prone_carriers
            .contains(&carrier_code.trim().to_ascii_lowercase())
    }
}
