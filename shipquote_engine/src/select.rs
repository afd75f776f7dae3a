//! Selector: keeps the cheapest quotes of a sorted category.

use crate::filter::PricedQuote;

/// Truncate an already sorted category to at most `max` quotes.
///
/// Returns the number of quotes cut off. The kept quotes are not re-sorted.
pub fn take_cheapest(quotes: &mut Vec<PricedQuote<'_>>, max: usize) -> usize {
    let cut = quotes.len().saturating_sub(max);
    quotes.truncate(max);
    cut
}
