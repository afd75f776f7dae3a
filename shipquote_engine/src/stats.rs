//! Diagnostics collected while consolidating a batch.
//!
//! Stats are emitted as log lines next to the pure computation and may be
//! handed to a host that wants them, but they never influence which quotes
//! are returned.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

/// Counters describing one consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationStats {
    /// Quotes received.
    pub input: usize,
    /// Quotes dropped for a missing, zero, negative or malformed price.
    pub invalid: usize,
    /// Valid service-point quotes before dedup.
    pub service_points: usize,
    /// Valid home-delivery quotes before dedup.
    pub home_delivery: usize,
    /// Service-point duplicates removed.
    pub service_point_duplicates: usize,
    /// Home-delivery duplicates removed.
    pub home_delivery_duplicates: usize,
    /// Quotes kept as variants of another quote with the same coarse key.
    pub variants_retained: usize,
    /// Service-point quotes cut by the per-category cap.
    pub service_points_truncated: usize,
    /// Home-delivery quotes cut by the per-category cap.
    pub home_delivery_truncated: usize,
    /// Quotes cut by the global cap after interleaving.
    pub total_truncated: usize,
    /// Quotes in the final list.
    pub output: usize,
    /// Invalid quotes per normalised carrier code.
    pub invalid_by_carrier: BTreeMap<String, usize>,
    /// Duplicates removed per normalised carrier code.
    pub duplicates_by_carrier: BTreeMap<String, usize>,
}

impl ConsolidationStats {
    /// Total duplicates removed across both categories.
    pub fn duplicates(&self) -> usize {
        self.service_point_duplicates + self.home_delivery_duplicates
    }

    /// Add per-carrier duplicate counts from one category.
    pub fn merge_duplicates(&mut self, by_carrier: &BTreeMap<String, usize>) {
        for (carrier, count) in by_carrier {
            *self.duplicates_by_carrier.entry(carrier.clone()).or_default() += count;
        }
    }

    /// Emit the stats through the `log` facade.
    pub fn log(&self) {
        info!(
            "Consolidated {} quotes into {} options (invalid={}, duplicates={}, variants={})",
            self.input,
            self.output,
            self.invalid,
            self.duplicates(),
            self.variants_retained
        );
        debug!(
            "Categories: service_points={} (dup={}, cut={}), home_delivery={} (dup={}, cut={}), total_cut={}",
            self.service_points,
            self.service_point_duplicates,
            self.service_points_truncated,
            self.home_delivery,
            self.home_delivery_duplicates,
            self.home_delivery_truncated,
            self.total_truncated
        );
        for (carrier, count) in &self.duplicates_by_carrier {
            debug!("Duplicates removed for carrier {}: {}", carrier, count);
        }
        for (carrier, count) in &self.invalid_by_carrier {
            debug!("Invalid quotes for carrier {}: {}", carrier, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_duplicates_accumulates() {
        let mut stats = ConsolidationStats::default();
        let mut first = BTreeMap::new();
        first.insert("ups".to_string(), 2);
        let mut second = BTreeMap::new();
        second.insert("ups".to_string(), 1);
        second.insert("dhl".to_string(), 3);

        stats.merge_duplicates(&first);
        stats.merge_duplicates(&second);
        assert_eq!(stats.duplicates_by_carrier.get("ups"), Some(&3));
        assert_eq!(stats.duplicates_by_carrier.get("dhl"), Some(&3));
    }

    #[test]
    fn test_duplicates_total() {
        let stats = ConsolidationStats {
            service_point_duplicates: 2,
            home_delivery_duplicates: 5,
            ..Default::default()
        };
        assert_eq!(stats.duplicates(), 7);
    }
}
