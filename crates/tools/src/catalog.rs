//! In-memory service catalog.
//!
//! Seeded with a small set of offerings per category so the agent loop can
//! be driven end-to-end without a backing store. A lookup returns every
//! offering in the category available at or below the requested tier,
//! best tier first.

use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::{CatalogSearchResult, ServiceCatalog, ServiceCategory, ServiceOffering, ServiceTier};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Id of the catch-all offering tickets fall back to.
pub const GENERAL_SERVICE_ID: &str = "concierge-general";

pub struct InMemoryCatalog {
    offerings: Arc<RwLock<Vec<ServiceOffering>>>,
}

impl InMemoryCatalog {
    pub fn new(offerings: Vec<ServiceOffering>) -> Self {
        Self {
            offerings: Arc::new(RwLock::new(offerings)),
        }
    }

    /// A catalog holding the built-in offerings.
    pub fn seeded() -> Self {
        Self::new(seed_offerings())
    }

    pub async fn add(&self, offering: ServiceOffering) {
        self.offerings.write().await.push(offering);
    }

    pub async fn get(&self, id: &str) -> Option<ServiceOffering> {
        self.offerings.read().await.iter().find(|o| o.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.offerings.read().await.len()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

fn matches_term(offering: &ServiceOffering, term: &str) -> bool {
    let term = term.to_lowercase();
    offering.tags.iter().any(|t| *t == term) || offering.name.to_lowercase().contains(&term)
}

#[async_trait]
impl ServiceCatalog for InMemoryCatalog {
    async fn search(
        &self,
        category: ServiceCategory,
        tier: ServiceTier,
        search_term: Option<&str>,
    ) -> Result<CatalogSearchResult, ToolError> {
        let offerings = self.offerings.read().await;
        let mut items: Vec<ServiceOffering> = offerings
            .iter()
            .filter(|o| o.category == category && o.tier <= tier)
            .filter(|o| search_term.is_none_or(|term| matches_term(o, term)))
            .cloned()
            .collect();
        // Stable sort keeps seed order within a tier
        items.sort_by(|a, b| b.tier.cmp(&a.tier));

        debug!(
            category = %category,
            tier = tier.as_str(),
            term = search_term.unwrap_or(""),
            found = items.len(),
            "Catalog search"
        );
        Ok(CatalogSearchResult {
            total_found: items.len(),
            items,
        })
    }
}

fn offering(
    id: &str,
    name: &str,
    category: ServiceCategory,
    tier: ServiceTier,
    starting_price: Option<f64>,
    tags: &[&str],
) -> ServiceOffering {
    ServiceOffering {
        id: id.into(),
        name: name.into(),
        category,
        tier,
        starting_price,
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
    }
}

fn seed_offerings() -> Vec<ServiceOffering> {
    use ServiceCategory::*;
    use ServiceTier::*;
    vec![
        offering("aviation-light-jet", "Light jet charter", Transportation, Enhanced, Some(12_000.0), &["private_aviation"]),
        offering("aviation-heavy-jet", "Heavy jet charter", Transportation, Premium, Some(45_000.0), &["private_aviation"]),
        offering("heli-transfer", "Helicopter transfer", Transportation, Enhanced, Some(3_500.0), &["helicopter"]),
        offering("yacht-sunset-cruise", "Sunset yacht cruise", Transportation, Enhanced, Some(4_000.0), &["yacht_charter"]),
        offering("yacht-day-charter", "Yacht day charter", Transportation, Premium, Some(18_000.0), &["yacht_charter"]),
        offering("ground-chauffeur", "Chauffeured car service", Transportation, Basic, Some(250.0), &["ground_transportation"]),
        offering("events-priority-table", "Priority restaurant table", Events, Basic, None, &["dining_reservation"]),
        offering("events-private-dining", "Private dining room", Events, Enhanced, Some(1_500.0), &["dining_reservation", "private_event"]),
        offering("events-vip-table", "VIP table at a partner venue", Events, Enhanced, Some(1_000.0), &["vip_access"]),
        offering("events-vip-access", "VIP access and guest lists", Events, Premium, Some(2_500.0), &["vip_access"]),
        offering("events-tickets", "Concert and show tickets", Events, Basic, Some(300.0), &["entertainment_tickets"]),
        offering("brand-social-audit", "Social media audit", BrandDevelopment, Basic, Some(1_200.0), &["social_media"]),
        offering("brand-pr-campaign", "PR campaign", BrandDevelopment, Enhanced, Some(8_000.0), &["public_relations"]),
        offering("brand-strategy-workshop", "Brand strategy workshop", BrandDevelopment, Enhanced, Some(4_500.0), &["brand_strategy"]),
        offering("brand-strategy-retainer", "Brand strategy retainer", BrandDevelopment, Premium, Some(15_000.0), &["brand_strategy"]),
        offering("invest-advisor-intro", "Wealth advisor introduction", Investments, Enhanced, None, &["wealth_management"]),
        offering("invest-property-briefing", "Property market briefing", Investments, Enhanced, None, &["real_estate"]),
        offering("invest-founder-pitch", "Founder pitch evening", Investments, Enhanced, None, &["venture_capital"]),
        offering("invest-real-estate-scout", "Real estate scouting", Investments, Premium, None, &["real_estate"]),
        offering("invest-deal-flow", "Curated venture deal flow", Investments, Premium, None, &["venture_capital"]),
        offering("community-introductions", "Member introductions", Community, Basic, None, &["introductions"]),
        offering("community-mentor-match", "Mentor matching", Community, Enhanced, None, &["mentorship"]),
        offering("community-member-mixer", "Member mixer", Community, Basic, None, &["member_events"]),
        offering("community-founders-dinner", "Founders dinner seat", Community, Premium, Some(500.0), &["member_events"]),
        offering(GENERAL_SERVICE_ID, "General concierge request", Lifestyle, Basic, None, &["general"]),
        offering("lifestyle-personal-shopper", "Personal shopper", Lifestyle, Enhanced, Some(800.0), &["personal_shopping"]),
        offering("lifestyle-private-chef", "Private chef evening", Lifestyle, Enhanced, Some(1_200.0), &["private_dining"]),
        offering("lifestyle-spa-day", "Spa day", Lifestyle, Enhanced, Some(600.0), &["wellness"]),
        offering("lifestyle-boutique-hotel", "Boutique hotel suite", Lifestyle, Enhanced, Some(1_100.0), &["travel_stays"]),
        offering("lifestyle-wellness-retreat", "Wellness retreat", Lifestyle, Premium, Some(6_000.0), &["wellness"]),
        offering("lifestyle-villa-stay", "Villa stay", Lifestyle, Premium, Some(9_000.0), &["travel_stays"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_category_has_offerings() {
        let catalog = InMemoryCatalog::seeded();
        for category in ServiceCategory::ALL {
            let found = catalog
                .search(category, ServiceTier::Premium, None)
                .await
                .unwrap();
            assert!(found.total_found > 0, "{category} has no offerings");
        }
    }

    #[tokio::test]
    async fn tier_caps_results() {
        let catalog = InMemoryCatalog::seeded();
        let basic = catalog
            .search(ServiceCategory::Transportation, ServiceTier::Basic, None)
            .await
            .unwrap();
        assert_eq!(basic.total_found, 1);
        assert_eq!(basic.items[0].id, "ground-chauffeur");

        let premium = catalog
            .search(ServiceCategory::Transportation, ServiceTier::Premium, None)
            .await
            .unwrap();
        assert_eq!(premium.items[0].tier, ServiceTier::Premium);
        assert_eq!(premium.total_found, 6);
    }

    #[tokio::test]
    async fn search_term_filters_by_tag() {
        let catalog = InMemoryCatalog::seeded();
        let found = catalog
            .search(ServiceCategory::Transportation, ServiceTier::Premium, Some("private_aviation"))
            .await
            .unwrap();
        assert_eq!(found.total_found, 2);
        assert_eq!(found.items[0].id, "aviation-heavy-jet");

        let none = catalog
            .search(ServiceCategory::Transportation, ServiceTier::Basic, Some("private_aviation"))
            .await
            .unwrap();
        assert_eq!(none.total_found, 0);
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn get_and_add() {
        let catalog = InMemoryCatalog::new(Vec::new());
        assert!(catalog.get(GENERAL_SERVICE_ID).await.is_none());
        catalog
            .add(offering("x", "X", ServiceCategory::Events, ServiceTier::Basic, None, &[]))
            .await;
        assert_eq!(catalog.len().await, 1);
        assert!(catalog.get("x").await.is_some());
        assert!(InMemoryCatalog::seeded().get(GENERAL_SERVICE_ID).await.is_some());
    }
}
