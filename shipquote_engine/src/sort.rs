//! Sorter: ascending price order within a category.

use crate::filter::PricedQuote;

/// Sort quotes by ascending numeric price.
///
/// The sort is stable: quotes with equal prices keep their relative input
/// order and no secondary key is applied.
pub fn sort_by_price(quotes: &mut [PricedQuote<'_>]) {
    quotes.sort_by(|a, b| a.amount.total_cmp(&b.amount));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote_common::{Quote, QuotePrice};

    fn quote(product: &str, price: &str) -> Quote {
        Quote {
            carrier_code: "chronopost".into(),
            product_code: product.into(),
            price: Some(QuotePrice::new(price, "EUR")),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        let quotes = vec![quote("a", "9.56"), quote("b", "10.71"), quote("c", "100")];
        let mut priced: Vec<_> = quotes.iter().filter_map(PricedQuote::new).collect();
        sort_by_price(&mut priced);
        let amounts: Vec<f64> = priced.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![9.56, 10.71, 100.0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let quotes = vec![
            quote("late", "6.04"),
            quote("cheap", "1.00"),
            quote("early", "6.04"),
            quote("last", "6.04"),
        ];
        let mut priced: Vec<_> = quotes.iter().filter_map(PricedQuote::new).collect();
        sort_by_price(&mut priced);
        let products: Vec<&str> = priced
            .iter()
            .map(|p| p.quote.product_code.as_str())
            .collect();
        assert_eq!(products, vec!["cheap", "late", "early", "last"]);
    }
}
