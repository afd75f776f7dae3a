//! The consolidation pipeline.
//!
//! `Consolidator` turns a raw aggregator response into the short list shown at
//! checkout. It is a single synchronous pass with no I/O and no shared
//! mutable state:
//!
//! Filter -> Categorize -> Deduplicate (x2) -> Sort (x2) -> Select (x2) -> Interleave -> global cap
//!
//! The returned list borrows from the input slice: quotes are only filtered
//! and reordered, never rewritten. An empty result is a normal outcome when no
//! quote carries a valid price.

use log::debug;
use shipquote_common::{ConsolidationConfig, Quote, Result};

use crate::categorize::categorize;
use crate::dedup::{DedupOutcome, DedupPolicies, Deduplicator, DuplicatePolicy};
use crate::filter::{PricedQuote, filter_valid};
use crate::interleave::interleave;
use crate::select::take_cheapest;
use crate::sort::sort_by_price;
use crate::stats::ConsolidationStats;

/// Final list plus the diagnostics gathered while producing it.
#[derive(Debug, Clone)]
pub struct Consolidation<'a> {
    /// Ordered quotes for display.
    pub options: Vec<&'a Quote>,
    /// Counters describing the run.
    pub stats: ConsolidationStats,
}

/// Reusable, thread-safe consolidation engine.
#[derive(Debug, Clone)]
pub struct Consolidator {
    config: ConsolidationConfig,
    deduplicator: Deduplicator,
}

impl Consolidator {
    /// Create an engine from a configuration, rejecting invalid settings.
    pub fn new(config: ConsolidationConfig) -> Result<Self> {
        Ok(Consolidator::from_valid(config.normalized().validated()?))
    }

    fn from_valid(config: ConsolidationConfig) -> Self {
        let deduplicator = Deduplicator::new(DedupPolicies::from_config(&config));
        Consolidator {
            config,
            deduplicator,
        }
    }

    /// Register a custom duplicate policy for one carrier.
    ///
    /// The policy lives in [`Self::policies`] only; `config().variant_prone_carriers`
    /// still lists just the carriers configured there.
    pub fn with_policy<P>(mut self, carrier_code: &str, policy: P) -> Self
    where
        P: DuplicatePolicy + 'static,
    {
        let policies = self.deduplicator.policies().clone().with_policy(carrier_code, policy);
        self.deduplicator = Deduplicator::new(policies);
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Duplicate policies in use, including ones added with [`Self::with_policy`].
    pub fn policies(&self) -> &DedupPolicies {
        self.deduplicator.policies()
    }

    /// Consolidate a raw batch into the ordered list shown to the customer.
    pub fn consolidate<'a>(&self, quotes: &'a [Quote]) -> Vec<&'a Quote> {
        self.consolidate_with_stats(quotes).options
    }

    /// Consolidate a raw batch, also returning diagnostics for the run.
    pub fn consolidate_with_stats<'a>(&self, quotes: &'a [Quote]) -> Consolidation<'a> {
        let mut stats = ConsolidationStats {
            input: quotes.len(),
            ..Default::default()
        };

        let filtered = filter_valid(quotes);
        stats.invalid = filtered.invalid.len();
        for quote in &filtered.invalid {
            *stats.invalid_by_carrier.entry(quote.carrier_key()).or_default() += 1;
        }

        let categorized = categorize(filtered.valid);
        stats.service_points = categorized.service_points.len();
        stats.home_delivery = categorized.home_delivery.len();

        let service_points = self.deduplicator.deduplicate(&categorized.service_points);
        let home_delivery = self.deduplicator.deduplicate(&categorized.home_delivery);
        stats.service_point_duplicates = service_points.removed;
        stats.home_delivery_duplicates = home_delivery.removed;
        stats.variants_retained = service_points.variants + home_delivery.variants;
        stats.merge_duplicates(&service_points.removed_by_carrier);
        stats.merge_duplicates(&home_delivery.removed_by_carrier);

        let (service_points, cut) = self.rank(service_points, self.config.max_service_points);
        stats.service_points_truncated = cut;
        let (home_delivery, cut) = self.rank(home_delivery, self.config.max_home_delivery);
        stats.home_delivery_truncated = cut;

        let mut options = interleave(&service_points, &home_delivery, self.config.interleave_ratio);
        stats.total_truncated = options.len().saturating_sub(self.config.max_total_options);
        options.truncate(self.config.max_total_options);
        stats.output = options.len();

        debug!(
            "Final order: {:?}",
            options
                .iter()
                .map(|quote| format!("{}/{}", quote.carrier_code, quote.product_code))
                .collect::<Vec<_>>()
        );
        stats.log();

        Consolidation { options, stats }
    }

    /// Sort a deduplicated category by price and keep its cheapest entries.
    fn rank<'a>(&self, outcome: DedupOutcome<'a>, max: usize) -> (Vec<&'a Quote>, usize) {
        let mut kept: Vec<PricedQuote<'a>> = outcome.kept;
        sort_by_price(&mut kept);
        let cut = take_cheapest(&mut kept, max);
        (kept.into_iter().map(|priced| priced.quote).collect(), cut)
    }
}

impl Default for Consolidator {
    fn default() -> Self {
        Consolidator::from_valid(ConsolidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::VariantAwarePolicy;
    use shipquote_common::{LastMileType, QuoteError, QuotePrice};

    fn quote(carrier: &str, product: &str, price: &str, last_mile: LastMileType) -> Quote {
        Quote {
            carrier_code: carrier.into(),
            carrier_name: carrier.to_uppercase(),
            product_code: product.into(),
            option_code: format!("{}:{}", carrier, product),
            price: Some(QuotePrice::new(price, "EUR")),
            last_mile_type: Some(last_mile.to_string()),
            ..Default::default()
        }
    }

    fn sp(carrier: &str, product: &str, price: &str) -> Quote {
        quote(carrier, product, price, LastMileType::ServicePoint)
    }

    fn hd(carrier: &str, product: &str, price: &str) -> Quote {
        quote(carrier, product, price, LastMileType::HomeDelivery)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ConsolidationConfig {
            interleave_ratio: 0,
            ..Default::default()
        };
        assert!(matches!(
            Consolidator::new(config),
            Err(QuoteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_normalizes_carriers() {
        let mut config = ConsolidationConfig::default();
        config.variant_prone_carriers.insert(" FedEx ".into());
        let engine = Consolidator::new(config).unwrap();
        assert!(engine.config().is_variant_prone("fedex"));
        assert!(engine.config().variant_prone_carriers.contains("fedex"));
    }

    #[test]
    fn test_empty_and_all_invalid_inputs_yield_empty_list() {
        let engine = Consolidator::default();
        assert!(engine.consolidate(&[]).is_empty());

        let quotes = vec![hd("postnl", "letter", "0"), sp("dhl", "parcel", "n/a")];
        let result = engine.consolidate_with_stats(&quotes);
        assert!(result.options.is_empty());
        assert_eq!(result.stats.invalid, 2);
        assert_eq!(result.stats.output, 0);
    }

    #[test]
    fn test_pipeline_order_and_caps() {
        let quotes = vec![
            hd("colissimo", "home", "8.95"),
            sp("chronopost", "shop2shop", "9.56"),
            sp("mondial_relay", "point_relais", "6.04"),
            hd("dhl", "parcel", "7.10"),
            sp("chronopost", "relais", "14.23"),
            sp("colissimo", "pickup", "10.71"),
            sp("chronopost", "relais_express", "19.16"),
        ];
        let engine = Consolidator::default();
        let options = engine.consolidate(&quotes);
        let names: Vec<&str> = options.iter().map(|q| q.product_code.as_str()).collect();
        assert_eq!(
            names,
            vec!["point_relais", "shop2shop", "parcel", "pickup", "relais", "home"]
        );
    }

    #[test]
    fn test_global_cap_truncates_after_interleave() {
        let config = ConsolidationConfig {
            max_total_options: 3,
            ..Default::default()
        };
        let quotes = vec![
            sp("a", "1", "1.00"),
            sp("b", "2", "2.00"),
            sp("c", "3", "3.00"),
            hd("d", "4", "4.00"),
            hd("e", "5", "5.00"),
        ];
        let result = Consolidator::new(config).unwrap().consolidate_with_stats(&quotes);
        let names: Vec<&str> = result.options.iter().map(|q| q.carrier_code.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "d"]);
        assert_eq!(result.stats.total_truncated, 2);
        assert_eq!(result.stats.output, 3);
    }

    #[test]
    fn test_stats_track_every_stage() {
        let ups = hd("ups", "standard", "12.30");
        let ups_signed = Quote {
            requires_signature: Some(true),
            ..ups.clone()
        };
        let quotes = vec![
            ups.clone(),
            ups_signed,
            ups,
            sp("mondial_relay", "point_relais", "6.04"),
            sp("mondial_relay", "point_relais", "6.04"),
            hd("postnl", "unstamped_letter", "0.00"),
        ];
        let result = Consolidator::default().consolidate_with_stats(&quotes);
        let stats = &result.stats;
        assert_eq!(stats.input, 6);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.invalid_by_carrier.get("postnl"), Some(&1));
        assert_eq!(stats.service_points, 2);
        assert_eq!(stats.home_delivery, 3);
        assert_eq!(stats.service_point_duplicates, 1);
        assert_eq!(stats.home_delivery_duplicates, 1);
        assert_eq!(stats.variants_retained, 1);
        assert_eq!(stats.duplicates_by_carrier.get("ups"), Some(&1));
        assert_eq!(stats.duplicates_by_carrier.get("mondial_relay"), Some(&1));
        assert_eq!(stats.output, 3);
    }

    #[test]
    fn test_output_borrows_input_quotes() {
        let quotes = vec![hd("dhl", "parcel", "7.10")];
        let options = Consolidator::default().consolidate(&quotes);
        assert!(std::ptr::eq(options[0], &quotes[0]));
    }

    #[test]
    fn test_with_policy_overrides_carrier() {
        let first = hd("dhl", "parcel", "7.10");
        let second = Quote {
            lead_time_days: Some(4),
            ..first.clone()
        };
        let quotes = vec![first, second];
        assert_eq!(Consolidator::default().consolidate(&quotes).len(), 1);
        let engine = Consolidator::default().with_policy("dhl", VariantAwarePolicy);
        assert_eq!(engine.consolidate(&quotes).len(), 2);
        assert_eq!(engine.policies().policy_for("dhl").name(), "variant-aware");
        assert!(!engine.config().is_variant_prone("dhl"));
        assert!(format!("{:?}", engine.policies()).contains("\"dhl\": \"variant-aware\""));
    }

    #[test]
    fn test_default_matches_new_with_default_config() {
        let built = Consolidator::new(ConsolidationConfig::default()).unwrap();
        let default = Consolidator::default();
        assert_eq!(built.config(), default.config());
        assert_eq!(
            format!("{:?}", built.policies()),
            format!("{:?}", default.policies())
        );
    }
}
