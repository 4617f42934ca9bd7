//! Rental price diagnostics.
//!
//! Explains why rental statistics cover fewer properties than the rental
//! table holds: every rental is classified by how its rent resolved, and
//! the rentals agents actually reach are compared against the valid ones.

use super::histogram::serialize_ordered;
use super::linker::{LinkPath, Linker};
use crate::models::{ListingType, PriceSource, PriceStatus};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// How a rental property's rent resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RentCategory {
    Rent,
    RentalIncome,
    Zero,
    Null,
    Absent,
    RentalInfoMissing,
    Invalid,
}

impl RentCategory {
    pub const ALL: [RentCategory; 7] = [
        RentCategory::Rent,
        RentCategory::RentalIncome,
        RentCategory::Zero,
        RentCategory::Null,
        RentCategory::Absent,
        RentCategory::RentalInfoMissing,
        RentCategory::Invalid,
    ];

    pub fn of(status: PriceStatus) -> Self {
        match status {
            PriceStatus::Valid {
                source: PriceSource::Primary,
                ..
            } => RentCategory::Rent,
            PriceStatus::Valid {
                source: PriceSource::Fallback,
                ..
            } => RentCategory::RentalIncome,
            PriceStatus::Zero => RentCategory::Zero,
            PriceStatus::Null => RentCategory::Null,
            PriceStatus::Absent => RentCategory::Absent,
            PriceStatus::SectionMissing => RentCategory::RentalInfoMissing,
            PriceStatus::Invalid => RentCategory::Invalid,
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, RentCategory::Rent | RentCategory::RentalIncome)
    }

    pub fn key(self) -> &'static str {
        match self {
            RentCategory::Rent => "withRent",
            RentCategory::RentalIncome => "withRentalIncome",
            RentCategory::Zero => "zeroRent",
            RentCategory::Null => "nullRent",
            RentCategory::Absent => "rentAbsent",
            RentCategory::RentalInfoMissing => "rentalInfoMissing",
            RentCategory::Invalid => "invalidRent",
        }
    }
}

impl fmt::Display for RentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RentCategory::Rent => "valid rent",
            RentCategory::RentalIncome => "valid rentalIncome (fallback)",
            RentCategory::Zero => "rent is 0",
            RentCategory::Null => "rent is null",
            RentCategory::Absent => "rent field missing",
            RentCategory::RentalInfoMissing => "rentalInfo missing",
            RentCategory::Invalid => "negative or non-numeric rent",
        };
        write!(f, "{}", text)
    }
}

/// Count and example ids of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub count: usize,
    pub examples: Vec<String>,
}

/// Unique rental ids reached by agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRentals {
    pub in_enquiries: BTreeSet<String>,
    pub in_inventories: BTreeSet<String>,
    pub total_linked: usize,
    pub with_valid_rent: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalReport {
    pub total_rentals: usize,
    #[serde(serialize_with = "serialize_ordered")]
    pub categories: Vec<(&'static str, CategoryCount)>,
    pub linked: LinkedRentals,
    /// Rentals no agent links to.
    pub unlinked: usize,
    /// Linked rentals without a valid rent.
    pub linked_without_rent: usize,
}

impl RentalReport {
    pub fn category(&self, category: RentCategory) -> Option<&CategoryCount> {
        self.categories
            .iter()
            .find(|(key, _)| *key == category.key())
            .map(|(_, entry)| entry)
    }

    pub fn count(&self, category: RentCategory) -> usize {
        self.category(category).map(|c| c.count).unwrap_or(0)
    }

    pub fn valid(&self) -> usize {
        self.count(RentCategory::Rent) + self.count(RentCategory::RentalIncome)
    }
}

pub fn analyze_rentals(linker: &Linker<'_>, example_limit: usize) -> RentalReport {
    let snapshot = linker.snapshot();

    let mut categories: Vec<(RentCategory, CategoryCount)> = RentCategory::ALL
        .iter()
        .map(|c| (*c, CategoryCount::default()))
        .collect();
    let mut valid_ids = BTreeSet::new();
    let mut total_rentals = 0;

    for (id, property) in &snapshot.properties {
        if property.listing() != ListingType::Rental {
            continue;
        }
        total_rentals += 1;

        let category = RentCategory::of(property.rental_price());
        if category.is_valid() {
            valid_ids.insert(id.as_str());
        }
        if let Some((_, entry)) = categories.iter_mut().find(|(c, _)| *c == category) {
            entry.count += 1;
            if entry.examples.len() < example_limit {
                entry.examples.push(id.clone());
            }
        }
    }

    let mut linked = LinkedRentals::default();
    for agent in snapshot.agents.values() {
        for link in linker.link(agent).properties {
            if link.property.listing() != ListingType::Rental {
                continue;
            }
            let ids = match link.path {
                LinkPath::Enquiry => &mut linked.in_enquiries,
                LinkPath::Inventory => &mut linked.in_inventories,
            };
            ids.insert(link.property_id.to_string());
        }
    }

    let union: BTreeSet<&String> = linked.in_enquiries.union(&linked.in_inventories).collect();
    linked.total_linked = union.len();
    linked.with_valid_rent = union
        .iter()
        .filter(|id| valid_ids.contains(id.as_str()))
        .count();

    let linked_without_rent = linked.total_linked - linked.with_valid_rent;
    let unlinked = total_rentals - linked.total_linked;

    RentalReport {
        total_rentals,
        categories: categories
            .into_iter()
            .map(|(category, count)| (category.key(), count))
            .collect(),
        linked,
        unlinked,
        linked_without_rent,
    }
}
