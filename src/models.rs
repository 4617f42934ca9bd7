//! Data models for the exported snapshots.
//!
//! This module contains the agent, enquiry and property records as they
//! appear in the JSON exports, together with the price resolution rules
//! shared by every report.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Listing type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    /// Property offered for sale
    Resale,
    /// Property offered for rent
    Rental,
    /// Anything else (commercial, plots, unknown strings)
    #[serde(other)]
    Other,
}

/// Raw state of a numeric price field in the export.
///
/// The exports are loose: a price can be missing, explicitly `null`, a
/// number, or something else entirely. Each state is kept apart so the
/// diagnostic reports can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PriceField {
    /// Field not present in its object.
    #[default]
    Absent,
    /// Field present with a `null` value.
    Null,
    /// Field holds a JSON number.
    Number(f64),
    /// Field holds a string, bool, array or object.
    Unreadable,
}

impl<'de> Deserialize<'de> for PriceField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => PriceField::Null,
            Value::Number(n) => n
                .as_f64()
                .map(PriceField::Number)
                .unwrap_or(PriceField::Unreadable),
            _ => PriceField::Unreadable,
        })
    }
}

/// Which link of a fallback chain produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// `pricing.totalAskPrice` or `rentalInfo.rent`
    Primary,
    /// Legacy `totalAskPrice` or `rentalInfo.rentalIncome`
    Fallback,
}

/// Outcome of resolving a property's price.
///
/// Only `Valid` prices take part in statistics. The other variants describe
/// why no price was found, judged from the primary field of the chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceStatus {
    Valid { amount: f64, source: PriceSource },
    Zero,
    Null,
    /// The primary field is missing from an existing section.
    Absent,
    /// The section holding the primary field (`pricing`, `rentalInfo`) is missing.
    SectionMissing,
    /// Negative or non-numeric value.
    Invalid,
}

impl PriceStatus {
    /// Returns the amount if the price is valid.
    pub fn amount(&self) -> Option<f64> {
        match self {
            PriceStatus::Valid { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.amount().is_some()
    }
}

/// One link of a price fallback chain. `None` means the enclosing section is missing.
pub type PriceSlot<'a> = (PriceSource, Option<&'a PriceField>);

/// Resolve a price from an ordered fallback chain.
///
/// The first link holding a number strictly greater than zero wins. When no
/// link qualifies, the status describes the first link.
pub fn resolve_price(chain: &[PriceSlot<'_>]) -> PriceStatus {
    for (source, slot) in chain {
        if let Some(PriceField::Number(n)) = slot {
            if *n > 0.0 {
                return PriceStatus::Valid {
                    amount: *n,
                    source: *source,
                };
            }
        }
    }

    match chain.first().and_then(|(_, slot)| *slot) {
        None => PriceStatus::SectionMissing,
        Some(PriceField::Absent) => PriceStatus::Absent,
        Some(PriceField::Null) => PriceStatus::Null,
        Some(PriceField::Number(n)) if *n == 0.0 => PriceStatus::Zero,
        Some(_) => PriceStatus::Invalid,
    }
}

/// Lenient field readers: a value of the wrong JSON type reads as absent
/// instead of failing the whole snapshot.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    /// Non-string elements become empty strings so list lengths are preserved.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    _ => String::new(),
                })
                .collect(),
            _ => Vec::new(),
        })
    }
}

/// A channel partner (agent) record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub phone_number: Option<String>,
    /// Enquiry ids the agent made.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub enquiry_did: Vec<String>,
    /// Property ids (or qcIds) the agent lists.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub my_inventories: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub fsm_token: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub area_of_operation: Vec<String>,
}

impl Agent {
    /// Agents holding at least one FSM token are eligible for zone categorization.
    pub fn has_fsm_token(&self) -> bool {
        !self.fsm_token.is_empty()
    }

    /// Name for display, falling back to the agent id.
    pub fn display_name<'a>(&'a self, agent_id: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => agent_id,
        }
    }

    pub fn display_phone(&self) -> &str {
        self.phone_number.as_deref().unwrap_or("")
    }
}

/// An enquiry record. Only the property reference is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub property_id: Option<String>,
}

impl Enquiry {
    pub fn property_ref(&self) -> Option<&str> {
        self.property_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub total_ask_price: PriceField,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalInfo {
    #[serde(default)]
    pub rent: PriceField,
    #[serde(default)]
    pub rental_income: PriceField,
}

/// A property record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub listing_type: Option<ListingType>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub pricing: Option<Pricing>,
    /// Legacy top-level asking price.
    #[serde(default)]
    pub total_ask_price: PriceField,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub rental_info: Option<RentalInfo>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub zone: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub qc_id: Option<String>,
}

impl Property {
    pub fn listing(&self) -> ListingType {
        self.listing_type.unwrap_or(ListingType::Other)
    }

    /// Free-text zone, if present and non-empty.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref().filter(|z| !z.is_empty())
    }

    /// Asking price: `pricing.totalAskPrice`, then legacy `totalAskPrice`.
    pub fn resale_price(&self) -> PriceStatus {
        resolve_price(&[
            (
                PriceSource::Primary,
                self.pricing.as_ref().map(|p| &p.total_ask_price),
            ),
            (PriceSource::Fallback, Some(&self.total_ask_price)),
        ])
    }

    /// Rent: `rentalInfo.rent`, then `rentalInfo.rentalIncome`.
    pub fn rental_price(&self) -> PriceStatus {
        let info = self.rental_info.as_ref();
        resolve_price(&[
            (PriceSource::Primary, info.map(|r| &r.rent)),
            (PriceSource::Fallback, info.map(|r| &r.rental_income)),
        ])
    }

    /// Price for the property's own listing type. `None` for other listing types.
    pub fn listing_price(&self) -> Option<(ListingType, PriceStatus)> {
        match self.listing() {
            ListingType::Resale => Some((ListingType::Resale, self.resale_price())),
            ListingType::Rental => Some((ListingType::Rental, self.rental_price())),
            ListingType::Other => None,
        }
    }
}
