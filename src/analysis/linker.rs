//! Reference resolution from agents to properties.
//!
//! An agent reaches properties along two independent paths: through the
//! enquiries it made (`enquiryDid` -> enquiry -> `propertyId`) and through
//! its own listings (`myInventories`, property ids). Dangling references are
//! skipped and only counted.

use crate::config::LinkerConfig;
use crate::models::{Agent, Property};
use crate::snapshot::Snapshot;

/// Which reference path produced a linked property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPath {
    Enquiry,
    Inventory,
}

/// A property reached from an agent.
#[derive(Debug, Clone, Copy)]
pub struct LinkedProperty<'a> {
    /// Table id of the property (also when reached through its qcId).
    pub property_id: &'a str,
    pub property: &'a Property,
    pub path: LinkPath,
}

/// Counts of references that did not resolve, plus qcId hits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDiagnostics {
    pub missing_enquiries: usize,
    pub enquiries_without_property: usize,
    pub dangling_property_refs: usize,
    pub missing_inventories: usize,
    pub resolved_by_qc_id: usize,
}

impl LinkDiagnostics {
    pub fn merge(&mut self, other: &LinkDiagnostics) {
        self.missing_enquiries += other.missing_enquiries;
        self.enquiries_without_property += other.enquiries_without_property;
        self.dangling_property_refs += other.dangling_property_refs;
        self.missing_inventories += other.missing_inventories;
        self.resolved_by_qc_id += other.resolved_by_qc_id;
    }

    /// References that led nowhere.
    pub fn unresolved(&self) -> usize {
        self.missing_enquiries
            + self.enquiries_without_property
            + self.dangling_property_refs
            + self.missing_inventories
    }
}

/// Properties linked to one agent, enquiry path first, each in list order.
///
/// The same property may appear more than once.
#[derive(Debug, Clone, Default)]
pub struct Links<'a> {
    pub properties: Vec<LinkedProperty<'a>>,
    pub diagnostics: LinkDiagnostics,
}

impl<'a> Links<'a> {
    #[cfg(test)]
    pub fn via(&self, path: LinkPath) -> impl Iterator<Item = &LinkedProperty<'a>> {
        self.properties.iter().filter(move |link| link.path == path)
    }
}

/// Resolves agent references against a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Linker<'a> {
    snapshot: &'a Snapshot,
    qc_id_fallback: bool,
}

impl<'a> Linker<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &LinkerConfig) -> Self {
        Self {
            snapshot,
            qc_id_fallback: config.qc_id_fallback,
        }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Collect the properties used by `agent`.
    pub fn link(&self, agent: &Agent) -> Links<'a> {
        let mut links = Links::default();

        for enquiry_id in &agent.enquiry_did {
            let Some(enquiry) = self.snapshot.enquiry(enquiry_id) else {
                links.diagnostics.missing_enquiries += 1;
                continue;
            };
            let Some(property_ref) = enquiry.property_ref() else {
                links.diagnostics.enquiries_without_property += 1;
                continue;
            };

            match self.snapshot.property(property_ref) {
                Some((property_id, property)) => links.properties.push(LinkedProperty {
                    property_id,
                    property,
                    path: LinkPath::Enquiry,
                }),
                None => links.diagnostics.dangling_property_refs += 1,
            }
        }

        for inventory_id in &agent.my_inventories {
            let resolved = match self.snapshot.property(inventory_id) {
                Some(found) => Some(found),
                None if self.qc_id_fallback => {
                    let found = self.snapshot.property_by_qc_id(inventory_id);
                    if found.is_some() {
                        links.diagnostics.resolved_by_qc_id += 1;
                    }
                    found
                }
                None => None,
            };

            match resolved {
                Some((property_id, property)) => links.properties.push(LinkedProperty {
                    property_id,
                    property,
                    path: LinkPath::Inventory,
                }),
                None => links.diagnostics.missing_inventories += 1,
            }
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::snapshot_from_json;
    use serde_json::json;

    fn sample_snapshot() -> Snapshot {
        snapshot_from_json(
            json!({
                "A1": {
                    "enquiryDid": ["E1", "E2", "E3", "E404"],
                    "myInventories": ["P2", "QC-3", "P404"]
                }
            }),
            json!({
                "E1": { "propertyId": "P1" },
                "E2": {},
                "E3": { "propertyId": "P999" }
            }),
            json!({
                "P1": { "listingType": "resale" },
                "P2": { "listingType": "rental" },
                "P3": { "listingType": "rental", "qcId": "QC-3" }
            }),
        )
    }

    #[test]
    fn test_link_both_paths() {
        let snapshot = sample_snapshot();
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let links = linker.link(&snapshot.agents["A1"]);

        let ids: Vec<_> = links.properties.iter().map(|l| l.property_id).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
        assert_eq!(links.via(LinkPath::Enquiry).count(), 1);
        assert_eq!(links.via(LinkPath::Inventory).count(), 2);
    }

    #[test]
    fn test_dangling_references_are_counted() {
        let snapshot = sample_snapshot();
        let linker = Linker::new(&snapshot, &LinkerConfig::default());
        let links = linker.link(&snapshot.agents["A1"]);

        assert_eq!(
            links.diagnostics,
            LinkDiagnostics {
                missing_enquiries: 1,
                enquiries_without_property: 1,
                dangling_property_refs: 1,
                missing_inventories: 1,
                resolved_by_qc_id: 1,
            }
        );
        assert_eq!(links.diagnostics.unresolved(), 4);
    }

    #[test]
    fn test_qc_fallback_disabled() {
        let snapshot = sample_snapshot();
        let config = LinkerConfig {
            qc_id_fallback: false,
        };
        let links = Linker::new(&snapshot, &config).link(&snapshot.agents["A1"]);

        let ids: Vec<_> = links.properties.iter().map(|l| l.property_id).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert_eq!(links.diagnostics.missing_inventories, 2);
        assert_eq!(links.diagnostics.resolved_by_qc_id, 0);
    }

    #[test]
    fn test_duplicate_references_are_kept() {
        let snapshot = snapshot_from_json(
            json!({ "A1": { "enquiryDid": ["E1"], "myInventories": ["P1", "P1"] } }),
            json!({ "E1": { "propertyId": "P1" } }),
            json!({ "P1": { "listingType": "resale" } }),
        );
        let links = Linker::new(&snapshot, &LinkerConfig::default()).link(&snapshot.agents["A1"]);
        assert_eq!(links.properties.len(), 3);
    }

    #[test]
    fn test_agent_without_references() {
        let snapshot = snapshot_from_json(json!({ "A1": {} }), json!({}), json!({}));
        let links = Linker::new(&snapshot, &LinkerConfig::default()).link(&snapshot.agents["A1"]);
        assert!(links.properties.is_empty());
        assert_eq!(links.diagnostics, LinkDiagnostics::default());
    }
}
