//! Dataset-wide property coverage.

use super::linker::{LinkPath, Linker};
use crate::models::ListingType;
use serde::Serialize;
use std::collections::BTreeSet;

/// Properties of one listing type in the whole snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCoverage {
    pub total: usize,
    pub with_price: usize,
    pub without_price: usize,
}

/// How agents use valid-priced properties of one listing type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUsage {
    pub via_enquiries: usize,
    pub via_inventories: usize,
    pub instances: usize,
    #[serde(skip)]
    pub property_ids: BTreeSet<String>,
    pub unique_properties: usize,
    /// Valid-priced properties no agent links to.
    pub unused_properties: usize,
}

impl AgentUsage {
    fn record(&mut self, property_id: &str, path: LinkPath) {
        match path {
            LinkPath::Enquiry => self.via_enquiries += 1,
            LinkPath::Inventory => self.via_inventories += 1,
        }
        self.instances += 1;
        self.property_ids.insert(property_id.to_string());
    }

    fn finish(&mut self, dataset: &ListingCoverage) {
        self.unique_properties = self.property_ids.len();
        self.unused_properties = dataset.with_price.saturating_sub(self.unique_properties);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub resale: ListingCoverage,
    pub rental: ListingCoverage,
    pub agent_resale: AgentUsage,
    pub agent_rental: AgentUsage,
}

pub fn analyze_coverage(linker: &Linker<'_>) -> CoverageReport {
    let snapshot = linker.snapshot();
    let mut report = CoverageReport::default();

    for property in snapshot.properties.values() {
        let (listing, status) = match property.listing_price() {
            Some((ListingType::Resale, status)) => (&mut report.resale, status),
            Some((ListingType::Rental, status)) => (&mut report.rental, status),
            _ => continue,
        };
        listing.total += 1;
        if status.is_valid() {
            listing.with_price += 1;
        } else {
            listing.without_price += 1;
        }
    }

    for agent in snapshot.agents.values() {
        for link in linker.link(agent).properties {
            match link.property.listing_price() {
                Some((ListingType::Resale, status)) if status.is_valid() => {
                    report.agent_resale.record(link.property_id, link.path)
                }
                Some((ListingType::Rental, status)) if status.is_valid() => {
                    report.agent_rental.record(link.property_id, link.path)
                }
                _ => {}
            }
        }
    }

    report.agent_resale.finish(&report.resale);
    report.agent_rental.finish(&report.rental);
    report
}
