//! Validity filter: drops quotes that cannot be sold.
//!
//! A quote survives only when its price parses to a finite number strictly
//! above zero. Free offerings (unstamped letters and the like), negative
//! amounts and unparseable strings are dropped silently; they are counted for
//! diagnostics but never turned into an error.

use log::debug;
use shipquote_common::Quote;

/// A valid quote paired with its parsed price.
///
/// The price is parsed once by the filter and carried through the rest of
/// the pipeline, so later stages never re-parse the raw string.
#[derive(Debug, Clone, Copy)]
pub struct PricedQuote<'a> {
    /// The untouched input quote.
    pub quote: &'a Quote,
    /// Parsed price, always finite and positive.
    pub amount: f64,
}

impl<'a> PricedQuote<'a> {
    /// Pair a quote with its price if the price is valid.
    pub fn new(quote: &'a Quote) -> Option<Self> {
        quote
            .parsed_price()
            .map(|amount| PricedQuote { quote, amount })
    }

    /// Price rounded to whole cents.
    pub fn cents(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }
}

/// Result of running the validity filter over a batch.
#[derive(Debug, Default)]
pub struct FilterOutcome<'a> {
    /// Valid quotes, in input order.
    pub valid: Vec<PricedQuote<'a>>,
    /// Quotes dropped for a missing, zero, negative or malformed price.
    pub invalid: Vec<&'a Quote>,
}

/// Keep only quotes with a positive, parseable price, preserving input order.
pub fn filter_valid(quotes: &[Quote]) -> FilterOutcome<'_> {
    let mut outcome = FilterOutcome::default();
    for quote in quotes {
        match PricedQuote::new(quote) {
            Some(priced) => outcome.valid.push(priced),
            None => {
                debug!(
                    "Dropping quote {}/{}: invalid price {:?}",
                    quote.carrier_code,
                    quote.product_code,
                    quote.price.as_ref().map(|price| price.value.as_str())
                );
                outcome.invalid.push(quote);
            }
        }
    }
    outcome
}
