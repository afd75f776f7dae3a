//! Last-mile delivery categories.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How the final delivery leg of a quote is performed.
///
/// Upstream aggregators send this as a free-form string; anything that is not
/// recognised as `service_point` is delivered to the door and lands in
/// [`LastMileType::HomeDelivery`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LastMileType {
    /// Parcel is collected by the customer at a pickup point or locker.
    ServicePoint,
    /// Parcel is delivered to the customer's address.
    #[default]
    HomeDelivery,
}

impl LastMileType {
    /// Resolve the raw upstream value, falling back to home delivery when the
    /// value is absent or unknown.
    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse().ok())
            .unwrap_or_default()
    }
}
