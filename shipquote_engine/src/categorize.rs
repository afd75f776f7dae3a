//! Categorizer: stable partition of valid quotes by last-mile type.

use shipquote_common::LastMileType;

use crate::filter::PricedQuote;

/// Valid quotes split by how the last leg is delivered.
#[derive(Debug, Default)]
pub struct Categorized<'a> {
    /// Pickup-point quotes, in input order.
    pub service_points: Vec<PricedQuote<'a>>,
    /// Door-delivery quotes (including quotes with no last-mile type), in input order.
    pub home_delivery: Vec<PricedQuote<'a>>,
}

impl Categorized<'_> {
    /// Total number of quotes across both groups.
    pub fn len(&self) -> usize {
        self.service_points.len() + self.home_delivery.len()
    }

    /// Whether both groups are empty.
    pub fn is_empty(&self) -> bool {
        self.service_points.is_empty() && self.home_delivery.is_empty()
    }
}

/// Partition quotes into service-point and home-delivery groups.
///
/// Every quote lands in exactly one group and relative order is preserved
/// within each group.
pub fn categorize<'a>(valid: Vec<PricedQuote<'a>>) -> Categorized<'a> {
    let (service_points, home_delivery): (Vec<_>, Vec<_>) = valid
        .into_iter()
        .partition(|priced| priced.quote.last_mile() == LastMileType::ServicePoint);
    Categorized {
        service_points,
        home_delivery,
    }
}
