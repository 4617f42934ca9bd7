//! Analysis modules.
//!
//! Everything here is synchronous and works on an already-loaded
//! [`Snapshot`](crate::snapshot::Snapshot) through a [`Linker`].

pub mod categorize;
pub mod coverage;
pub mod histogram;
pub mod linker;
pub mod prices;
pub mod rentals;
pub mod zone;
pub mod zones;

pub use categorize::{categorize_agents, Categorization};
pub use coverage::{analyze_coverage, CoverageReport};
pub use linker::Linker;
pub use prices::{
    analyze_prices, select_price_rows, AgentPrices, ListingFilter, PriceOverview, PriceSort,
};
pub use rentals::{analyze_rentals, RentCategory, RentalReport};
pub use zone::ZoneLabels;
pub use zones::{analyze_zones, select_zone_rows, AgentZones, ZoneSort};

/// Row filter shared by the price and zone reports.
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    /// Case-insensitive substring of the agent name or id.
    pub search: Option<String>,
    pub fsm_only: bool,
}

impl AgentQuery {
    pub fn matches(&self, agent_id: &str, name: &str, has_fsm_token: bool) -> bool {
        if self.fsm_only && !has_fsm_token {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                name.to_lowercase().contains(&term) || agent_id.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

/// `count / total * 100`, or 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::zone::{Bucket, Zone};
    use crate::config::Config;
    use crate::snapshot::{fixture_paths, Snapshot};
    use indicatif::ProgressBar;

    fn load_fixtures() -> Snapshot {
        let (snapshot, _) = tokio_test::block_on(Snapshot::load(&fixture_paths())).unwrap();
        snapshot
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_agent_query() {
        let query = AgentQuery {
            search: Some("  RAV ".to_string()),
            fsm_only: false,
        };
        assert!(query.matches("CP1", "Ravi", false));
        assert!(query.matches("rav-7", "Someone", false));
        assert!(!query.matches("CP2", "Asha", true));

        let blank = AgentQuery {
            search: Some("   ".to_string()),
            fsm_only: true,
        };
        assert!(blank.matches("CP1", "Ravi", true));
        assert!(!blank.matches("CP1", "Ravi", false));
    }

    #[test]
    fn test_fixture_prices() {
        let snapshot = load_fixtures();
        let config = Config::default();
        let linker = Linker::new(&snapshot, &config.linker);
        let analysis = analyze_prices(&linker);

        let cp001 = &analysis.agents[0];
        assert_eq!(cp001.agent_id, "CP001");
        assert_eq!(cp001.stats.resale.count, 2);
        assert_eq!(cp001.stats.resale.average_price, 7000000.0);
        assert_eq!(cp001.stats.rental.count, 2);
        assert_eq!(cp001.stats.rental.average_price, 27500.0);
        assert_eq!(cp001.stats.overall.count, 4);
        assert_eq!(cp001.stats.overall.average_price, 3513750.0);
        assert_eq!(analysis.diagnostics.missing_enquiries, 1);
        assert_eq!(analysis.diagnostics.resolved_by_qc_id, 1);
    }

    #[test]
    fn test_fixture_zones() {
        let snapshot = load_fixtures();
        let linker = Linker::new(&snapshot, &Config::default().linker);
        let rows = analyze_zones(&linker, &ZoneLabels::default());

        let cp001 = &rows[0].breakdown;
        assert_eq!(cp001.share("South Bangalore").unwrap().percentage, 50.0);
        assert_eq!(cp001.share("North Bangalore").unwrap().percentage, 25.0);
        assert_eq!(cp001.share("East Bangalore").unwrap().percentage, 25.0);
    }

    #[test]
    fn test_fixture_categorization() {
        let snapshot = load_fixtures();
        let linker = Linker::new(&snapshot, &Config::default().linker);
        let result = categorize_agents(&linker, &ProgressBar::hidden());

        assert_eq!(result.agents_in(Bucket::Zone(Zone::South)), ["CP001".to_string()]);
        assert_eq!(result.agents_in(Bucket::Pan), ["CP002".to_string()]);
        assert_eq!(result.agents_in(Bucket::Zone(Zone::East)), ["CP004".to_string()]);

        let summary = result.summary(&ZoneLabels::default());
        assert_eq!(summary.total_agents_with_fsm_token, 3);
        assert_eq!(summary.categorized_using_enquiry_property_data, 1);
        assert_eq!(summary.categorized_using_area_of_operation, 2);
    }

    #[test]
    fn test_fixture_coverage_and_rentals() {
        let snapshot = load_fixtures();
        let linker = Linker::new(&snapshot, &Config::default().linker);

        let coverage = analyze_coverage(&linker);
        assert_eq!(coverage.resale.total, 3);
        assert_eq!(coverage.resale.with_price, 2);
        assert_eq!(coverage.rental.total, 4);
        assert_eq!(coverage.rental.with_price, 2);
        assert_eq!(coverage.agent_resale.via_enquiries, 2);
        assert_eq!(coverage.agent_rental.via_inventories, 2);
        assert_eq!(coverage.agent_resale.unused_properties, 0);
        assert_eq!(coverage.agent_rental.unused_properties, 0);

        let rentals = analyze_rentals(&linker, 3);
        assert_eq!(rentals.count(RentCategory::Rent), 1);
        assert_eq!(rentals.count(RentCategory::RentalIncome), 1);
        assert_eq!(rentals.count(RentCategory::Null), 1);
        assert_eq!(rentals.count(RentCategory::RentalInfoMissing), 1);
        assert_eq!(rentals.linked.total_linked, 3);
        assert_eq!(rentals.unlinked, 1);
        assert_eq!(rentals.linked_without_rent, 1);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let snapshot = load_fixtures();
        let linker = Linker::new(&snapshot, &Config::default().linker);

        let zones = |linker: &Linker<'_>| {
            serde_json::to_string(&analyze_zones(linker, &ZoneLabels::default())).unwrap()
        };
        assert_eq!(zones(&linker), zones(&linker));

        let summary = |linker: &Linker<'_>| {
            let result = categorize_agents(linker, &ProgressBar::hidden());
            serde_json::to_string(&result.summary(&ZoneLabels::default())).unwrap()
        };
        assert_eq!(summary(&linker), summary(&linker));
    }
}
