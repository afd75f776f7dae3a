//! Carrier quote data model and parsing helpers.
//!
//! A `Quote` is one carrier/product/price offer returned by a rate-shopping
//! aggregator for a single shipment. Quotes are immutable inputs to the
//! consolidation engine: it filters, groups, and reorders them but never
//! rewrites a field. This module also provides defensive price parsing and a
//! reader for whole quote batches encoded as JSON.

use std::io::Read;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::QuoteError;
use crate::last_mile::LastMileType;

/// Quotes read from one upstream response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteBatch {
    /// Quotes that could be decoded, in input order.
    pub quotes: Vec<Quote>,
    /// Items that were not quote objects at all and were skipped.
    pub skipped: usize,
}

/// Trait providing batch parsing for quotes.
pub trait QuoteBatchParser {
    /// Reads a batch of quotes from a reader.
    ///
    /// Accepts either a bare JSON array of quotes or an object with a `quotes`
    /// array. Only a document that is not such a list is an error. Quotes are
    /// decoded leniently: a malformed price or lead time is kept as an unusable
    /// value and later dropped by the engine, and an item that cannot be read as
    /// a quote at all is logged and counted in [`QuoteBatch::skipped`].
    fn read_batch<R: Read>(reader: R) -> Result<QuoteBatch, QuoteError>;

    /// Like [`Self::read_batch`], returning only the decoded quotes.
    fn parse_batch<R: Read>(reader: R) -> Result<Vec<Quote>, QuoteError> {
        Self::read_batch(reader).map(|batch| batch.quotes)
    }
}

/// Shipping quote for one carrier service instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Carrier identifier (e.g., `ups`).
    #[serde(default)]
    pub carrier_code: String,
    /// Carrier display name (e.g., `UPS`).
    #[serde(default)]
    pub carrier_name: String,
    /// Service tier identifier (e.g., `express_saver`).
    #[serde(default)]
    pub product_code: String,
    /// Service tier display name.
    #[serde(default)]
    pub product_name: String,
    /// Carrier+product+locale composite identifier; not unique across quotes.
    #[serde(default)]
    pub option_code: String,
    /// Display name of the option; may coincide across distinct quotes.
    #[serde(default)]
    pub option_name: String,
    /// Quoted price, absent for some free offerings.
    #[serde(
        default,
        deserialize_with = "lenient_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<QuotePrice>,
    /// Estimated transit time in days.
    #[serde(
        default,
        deserialize_with = "lenient_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub lead_time_days: Option<u32>,
    /// Raw last-mile type as sent upstream (`service_point` or `home_delivery`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_mile_type: Option<String>,
    /// Whether the service requires a signature on delivery.
    #[serde(
        default,
        deserialize_with = "lenient_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_signature: Option<bool>,
}

/// Price of a quote: a string-encoded decimal amount plus its currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotePrice {
    /// Decimal amount as received (e.g., `"25.17"`). Numbers are kept in string form.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub value: String,
    /// ISO currency code (e.g., `EUR`).
    #[serde(default)]
    pub currency: String,
}

impl QuotePrice {
    /// Create a price from a decimal string and a currency code.
    pub fn new(value: &str, currency: &str) -> Self {
        QuotePrice {
            value: String::from(value),
            currency: String::from(currency),
        }
    }

    /// Parse the amount, returning `None` unless it is a finite number strictly above zero.
    pub fn amount(&self) -> Option<f64> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
    }
}

impl Quote {
    /// Parsed price of the quote, or `None` when the quote is not sellable.
    pub fn parsed_price(&self) -> Option<f64> {
        self.price.as_ref().and_then(QuotePrice::amount)
    }

    /// Effective last-mile type; absent or unknown values mean home delivery.
    pub fn last_mile(&self) -> LastMileType {
        LastMileType::from_raw(self.last_mile_type.as_deref())
    }

    /// Normalised carrier code used for policy lookups and diagnostics.
    pub fn carrier_key(&self) -> String {
        self.carrier_code.trim().to_ascii_lowercase()
    }
}

impl QuoteBatchParser for Quote {
    fn read_batch<R: Read>(reader: R) -> Result<QuoteBatch, QuoteError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Batch {
            List(Vec<Value>),
            Wrapped { quotes: Vec<Value> },
        }

        let items = match serde_json::from_reader(reader) {
            Ok(Batch::List(items)) | Ok(Batch::Wrapped { quotes: items }) => items,
            Err(e) if e.is_data() => {
                return Err(QuoteError::Format(
                    "expected a JSON array of quotes or an object with a `quotes` array"
                        .to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let mut batch = QuoteBatch::default();
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<Quote>(item) {
                Ok(quote) => batch.quotes.push(quote),
                Err(e) => {
                    warn!("Skipping quote #{}: {}", index, e);
                    batch.skipped += 1;
                }
            }
        }
        Ok(batch)
    }
}

/// Text form of a scalar amount; anything else becomes an empty string.
fn amount_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(amount_text(&Value::deserialize(deserializer)?))
}

/// Accepts `{ "value", "currency" }`, a bare string or a bare number.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<QuotePrice>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Object(fields) => Some(QuotePrice {
            value: fields.get("value").map(amount_text).unwrap_or_default(),
            currency: fields
                .get("currency")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        scalar @ (Value::String(_) | Value::Number(_)) => Some(QuotePrice {
            value: amount_text(&scalar),
            currency: String::new(),
        }),
        _ => Some(QuotePrice::default()),
    })
}

fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|days| u32::try_from(days).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(value: &str) -> Quote {
        Quote {
            carrier_code: "colissimo".into(),
            price: Some(QuotePrice::new(value, "EUR")),
            ..Default::default()
        }
    }

    #[test]
    fn test_parsed_price_accepts_positive_decimals() {
        assert_eq!(priced("25.17").parsed_price(), Some(25.17));
        assert_eq!(priced(" 6.04 ").parsed_price(), Some(6.04));
    }

    #[test]
    fn test_parsed_price_rejects_invalid_amounts() {
        for value in ["0", "0.00", "-1", "abc", "", "NaN", "inf", "-inf"] {
            assert_eq!(priced(value).parsed_price(), None, "value {:?}", value);
        }
        let no_price = Quote::default();
        assert_eq!(no_price.parsed_price(), None);
    }

    #[test]
    fn test_last_mile_defaults_to_home_delivery() {
        let mut quote = priced("1.00");
        assert_eq!(quote.last_mile(), LastMileType::HomeDelivery);
        quote.last_mile_type = Some("service_point".into());
        assert_eq!(quote.last_mile(), LastMileType::ServicePoint);
    }

    #[test]
    fn test_carrier_key_is_normalised() {
        let quote = Quote {
            carrier_code: " UPS ".into(),
            ..Default::default()
        };
        assert_eq!(quote.carrier_key(), "ups");
    }

    #[test]
    fn test_deserialize_camel_case_with_numeric_price() {
        let json = r#"{
            "carrierCode": "ups",
            "carrierName": "UPS",
            "productCode": "express_saver",
            "productName": "Express Saver",
            "optionCode": "ups:express_saver,fr",
            "optionName": "UPS Express Saver",
            "price": { "value": 18.4, "currency": "EUR" },
            "leadTimeDays": 2,
            "requiresSignature": true
        }"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.carrier_code, "ups");
        assert_eq!(quote.option_code, "ups:express_saver,fr");
        assert_eq!(quote.parsed_price(), Some(18.4));
        assert_eq!(quote.lead_time_days, Some(2));
        assert_eq!(quote.requires_signature, Some(true));
        assert_eq!(quote.last_mile_type, None);
    }

    #[test]
    fn test_deserialize_null_price_value() {
        let json = r#"{ "carrierCode": "postnl", "price": { "value": null, "currency": "EUR" } }"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.parsed_price(), None);
    }

    #[test]
    fn test_parse_batch_accepts_list_and_wrapped_forms() {
        let list = r#"[{ "carrierCode": "dhl" }, { "carrierCode": "ups" }]"#;
        let quotes = Quote::parse_batch(list.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 2);

        let wrapped = r#"{ "quotes": [{ "carrierCode": "dhl" }] }"#;
        let quotes = Quote::parse_batch(wrapped.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].carrier_code, "dhl");
    }

    #[test]
    fn test_parse_batch_rejects_malformed_json() {
        let result = Quote::parse_batch("{ not json".as_bytes());
        assert!(matches!(result, Err(QuoteError::SerdeJson(_))));
        let result = Quote::parse_batch(r#"{ "rates": [] }"#.as_bytes());
        assert!(matches!(result, Err(QuoteError::Format(_))));
    }

    const DHL_PARCEL: &str =
        r#"{ "carrierCode": "dhl", "productCode": "parcel", "price": { "value": "7.10", "currency": "EUR" } }"#;

    fn batch_with(bad: &str) -> QuoteBatch {
        let json = format!("[{}, {}]", DHL_PARCEL, bad);
        Quote::read_batch(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_bare_string_price_is_accepted() {
        let batch = batch_with(r#"{ "carrierCode": "ups", "price": "12.30" }"#);
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.quotes.len(), 2);
        assert_eq!(batch.quotes[0].parsed_price(), Some(7.10));
        assert_eq!(batch.quotes[1].parsed_price(), Some(12.30));

        let batch = batch_with(r#"{ "carrierCode": "ups", "price": 9.5 }"#);
        assert_eq!(batch.quotes[1].parsed_price(), Some(9.5));
    }

    #[test]
    fn test_non_scalar_price_value_becomes_invalid_price() {
        let batch = batch_with(
            r#"{ "carrierCode": "ups", "price": { "value": true, "currency": "EUR" } }"#,
        );
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.quotes.len(), 2);
        assert_eq!(batch.quotes[0].parsed_price(), Some(7.10));
        assert_eq!(batch.quotes[1].parsed_price(), None);
        assert_eq!(batch.quotes[1].price.as_ref().unwrap().currency, "EUR");

        let batch = batch_with(r#"{ "carrierCode": "ups", "price": [1, 2] }"#);
        assert_eq!(batch.quotes[1].parsed_price(), None);
    }

    #[test]
    fn test_negative_lead_time_becomes_none() {
        let batch = batch_with(
            r#"{ "carrierCode": "ups", "price": { "value": "12.30" }, "leadTimeDays": -1 }"#,
        );
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.quotes[1].lead_time_days, None);
        assert_eq!(batch.quotes[1].parsed_price(), Some(12.30));

        let batch = batch_with(r#"{ "carrierCode": "ups", "leadTimeDays": "3" }"#);
        assert_eq!(batch.quotes[1].lead_time_days, Some(3));
    }

    #[test]
    fn test_malformed_signature_flag_becomes_none() {
        let batch = batch_with(r#"{ "carrierCode": "ups", "requiresSignature": "yes" }"#);
        assert_eq!(batch.quotes[1].requires_signature, None);
    }

    #[test]
    fn test_unreadable_items_are_skipped_and_counted() {
        let batch = batch_with(r#"42"#);
        assert_eq!(batch.quotes.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.quotes[0].carrier_code, "dhl");

        let batch = batch_with(r#"{ "carrierCode": 17 }"#);
        assert_eq!(batch.quotes.len(), 1);
        assert_eq!(batch.skipped, 1);
    }
}
