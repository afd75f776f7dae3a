//! Carrier-aware deduplication of quotes within one category.
//!
//! Aggregators often return the same offering several times, differing only in
//! internal service flags. This module collapses such true duplicates while
//! keeping quotes that differ in anything a customer can see.
//!
//! The first pass groups quotes by a coarse key of carrier, product and price
//! in whole cents. Two quotes that share a coarse key are then compared by the
//! [`DuplicatePolicy`] registered for the candidate's carrier:
//!
//! - [`VariantAwarePolicy`] is used for variant-prone carriers (UPS by default),
//!   which return structurally distinct services at the same carrier, product
//!   and price. A quote is dropped only if every exposed attribute matches.
//! - [`PriceSimilarityPolicy`] is used for every other carrier. A quote is
//!   dropped when the last-mile type matches and the price difference is below
//!   the configured threshold.
//!
//! Design notes:
//! - Dedup is order-preserving: the output is a subsequence of the input and
//!   the first occurrence of each offering wins.
//! - A coarse key may hold several retained quotes (variants). A later quote
//!   is compared against all of them.
//! - Running the deduplicator on its own output is a no-op.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use log::debug;
use shipquote_common::ConsolidationConfig;

use crate::filter::PricedQuote;

/// Decides whether a candidate quote repeats a quote that was already kept.
///
/// Both quotes are guaranteed to share a coarse key (carrier, product and
/// price in cents) when the policy is asked.
pub trait DuplicatePolicy: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `true` when `candidate` adds nothing over `kept` and should be dropped.
    fn is_duplicate(&self, kept: &PricedQuote<'_>, candidate: &PricedQuote<'_>) -> bool;
}

/// Fine-grained equality for carriers that emit distinct variants at one price.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantAwarePolicy;

impl DuplicatePolicy for VariantAwarePolicy {
    fn name(&self) -> &'static str {
        "variant-aware"
    }

    fn is_duplicate(&self, kept: &PricedQuote<'_>, candidate: &PricedQuote<'_>) -> bool {
        let (a, b) = (kept.quote, candidate.quote);
        a.requires_signature == b.requires_signature
            && a.last_mile() == b.last_mile()
            && a.product_code == b.product_code
            && a.option_code == b.option_code
            && a.option_name == b.option_name
            && a.lead_time_days == b.lead_time_days
    }
}

/// Price-proximity equality used for ordinary carriers.
#[derive(Debug, Clone, Copy)]
pub struct PriceSimilarityPolicy {
    /// Prices strictly closer than this are considered equal.
    pub threshold: f64,
}

impl PriceSimilarityPolicy {
    /// Create a policy with the given threshold in currency units.
    pub fn new(threshold: f64) -> Self {
        PriceSimilarityPolicy { threshold }
    }
}

impl DuplicatePolicy for PriceSimilarityPolicy {
    fn name(&self) -> &'static str {
        "price-similarity"
    }

    fn is_duplicate(&self, kept: &PricedQuote<'_>, candidate: &PricedQuote<'_>) -> bool {
        kept.quote.last_mile() == candidate.quote.last_mile()
            && (kept.amount - candidate.amount).abs() < self.threshold
    }
}

/// Registry mapping carrier codes to their duplicate policy.
#[derive(Clone)]
pub struct DedupPolicies {
    by_carrier: HashMap<String, Arc<dyn DuplicatePolicy>>,
    fallback: Arc<dyn DuplicatePolicy>,
}

impl DedupPolicies {
    /// Build the registry from config: variant-prone carriers get the
    /// variant-aware policy, everything else the price-similarity policy.
    pub fn from_config(config: &ConsolidationConfig) -> Self {
        let variant_aware: Arc<dyn DuplicatePolicy> = Arc::new(VariantAwarePolicy);
        let by_carrier = config
            .variant_prone_carriers
            .iter()
            .map(|carrier| (carrier.clone(), Arc::clone(&variant_aware)))
            .collect();
        DedupPolicies {
            by_carrier,
            fallback: Arc::new(PriceSimilarityPolicy::new(
                config.price_similarity_threshold,
            )),
        }
    }

    /// Register a custom policy for one carrier, replacing any existing one.
    pub fn with_policy<P>(mut self, carrier_code: &str, policy: P) -> Self
    where
        P: DuplicatePolicy + 'static,
    {
        self.by_carrier
            .insert(carrier_code.trim().to_ascii_lowercase(), Arc::new(policy));
        self
    }

    /// Policy for a normalised carrier code.
    pub fn policy_for(&self, carrier_key: &str) -> &dyn DuplicatePolicy {
        self.by_carrier
            .get(carrier_key)
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for DedupPolicies {
    fn default() -> Self {
        DedupPolicies::from_config(&ConsolidationConfig::default())
    }
}

impl fmt::Debug for DedupPolicies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let carriers: BTreeMap<&str, &str> = self
            .by_carrier
            .iter()
            .map(|(carrier, policy)| (carrier.as_str(), policy.name()))
            .collect();
        f.debug_struct("DedupPolicies")
            .field("by_carrier", &carriers)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

/// First-pass grouping key: carrier, product and price in whole cents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoarseKey {
    carrier: String,
    product: String,
    cents: i64,
}

impl CoarseKey {
    /// Compute the coarse key of a priced quote.
    pub fn of(priced: &PricedQuote<'_>) -> Self {
        CoarseKey {
            carrier: priced.quote.carrier_key(),
            product: priced.quote.product_code.clone(),
            cents: priced.cents(),
        }
    }
}

/// Result of deduplicating one category.
#[derive(Debug, Default)]
pub struct DedupOutcome<'a> {
    /// Retained quotes, in input order.
    pub kept: Vec<PricedQuote<'a>>,
    /// Number of true duplicates dropped.
    pub removed: usize,
    /// Quotes kept although another quote already held their coarse key.
    pub variants: usize,
    /// Dropped duplicates per normalised carrier code.
    pub removed_by_carrier: BTreeMap<String, usize>,
}

/// Order-preserving deduplicator driven by per-carrier policies.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    policies: DedupPolicies,
}

impl Deduplicator {
    /// Create a deduplicator over the given policy registry.
    pub fn new(policies: DedupPolicies) -> Self {
        Deduplicator { policies }
    }

    /// Policy registry in use.
    pub fn policies(&self) -> &DedupPolicies {
        &self.policies
    }

    /// Remove true duplicates, keeping the first occurrence of each offering.
    pub fn deduplicate<'a>(&self, quotes: &[PricedQuote<'a>]) -> DedupOutcome<'a> {
        let mut outcome = DedupOutcome::default();
        let mut kept_by_key: HashMap<CoarseKey, Vec<PricedQuote<'a>>> = HashMap::new();

        for candidate in quotes {
            let key = CoarseKey::of(candidate);
            let policy = self.policies.policy_for(&key.carrier);
            let siblings = kept_by_key.entry(key).or_default();

            if siblings
                .iter()
                .any(|kept| policy.is_duplicate(kept, candidate))
            {
                debug!(
                    "Duplicate {} {}/{} at {:.2} dropped ({})",
                    candidate.quote.carrier_code,
                    candidate.quote.product_code,
                    candidate.quote.option_code,
                    candidate.amount,
                    policy.name()
                );
                outcome.removed += 1;
                *outcome
                    .removed_by_carrier
                    .entry(candidate.quote.carrier_key())
                    .or_default() += 1;
                continue;
            }

            if !siblings.is_empty() {
                debug!(
                    "Variant {} {}/{} at {:.2} kept alongside {} sibling(s)",
                    candidate.quote.carrier_code,
                    candidate.quote.product_code,
                    candidate.quote.option_code,
                    candidate.amount,
                    siblings.len()
                );
                outcome.variants += 1;
            }
            siblings.push(*candidate);
            outcome.kept.push(*candidate);
        }
        outcome
    }
}
