//! Reference collaborators for the Concierge agent.
//!
//! In-memory implementations of the service catalog, ticket store,
//! notification channel, web search and interaction log. They are enough
//! to run the agent end-to-end from the CLI and in tests; production
//! deployments swap in their own implementations of the core traits.

pub mod catalog;
pub mod interaction_log;
pub mod notify;
pub mod throttle;
pub mod ticket;
pub mod web_search;

pub use catalog::{GENERAL_SERVICE_ID, InMemoryCatalog};
pub use interaction_log::InMemoryInteractionLog;
pub use notify::LogNotifier;
pub use throttle::{Clock, ManualClock, NotificationThrottle, SystemClock, ThrottledChannel};
pub use ticket::InMemoryTicketStore;
pub use web_search::MockSearchProvider;

use concierge_config::NotificationConfig;
use concierge_core::ToolSet;
use std::sync::Arc;

/// Create a tool set backed by the in-memory collaborators.
///
/// Tickets are priced from the seeded catalog and the notifier is wrapped
/// in a throttle built from `notifications`.
pub fn default_toolset(notifications: &NotificationConfig) -> ToolSet {
    let catalog = Arc::new(InMemoryCatalog::seeded());
    let tickets = InMemoryTicketStore::new().with_catalog(catalog.clone());
    let throttle = Arc::new(NotificationThrottle::from_config(
        notifications,
        Arc::new(SystemClock),
    ));
    let notifier = ThrottledChannel::new(LogNotifier::new(), throttle);

    ToolSet::new(catalog, Arc::new(tickets), Arc::new(notifier))
        .with_search(Arc::new(MockSearchProvider::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::tool::{LookupParams, SearchParams};
    use concierge_core::{ServiceCategory, ServiceTier, ToolOutput, ToolParams};

    #[tokio::test]
    async fn default_toolset_answers_every_read_tool() {
        let tools = default_toolset(&NotificationConfig::default());

        let lookup = tools
            .invoke(&ToolParams::ServiceLookup(LookupParams {
                category: ServiceCategory::Lifestyle,
                tier: ServiceTier::Basic,
                search_term: None,
            }))
            .await
            .unwrap();
        match lookup {
            ToolOutput::ServiceLookup(found) => assert_eq!(found.items[0].id, GENERAL_SERVICE_ID),
            other => panic!("unexpected output {other:?}"),
        }

        let search = tools
            .invoke(&ToolParams::WebSearch(SearchParams {
                query: "dinner".into(),
            }))
            .await
            .unwrap();
        assert!(matches!(search, ToolOutput::Search(hits) if !hits.is_empty()));
    }
}
