//! In-memory ticket store.

use crate::catalog::InMemoryCatalog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::error::ToolError;
use concierge_core::tool::Pricing;
use concierge_core::{ToolKind, TicketParams, TicketPriority, TicketReceipt, TicketStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

const CURRENCY: &str = "USD";

/// A ticket as the store keeps it.
#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub receipt: TicketReceipt,
    pub params: TicketParams,
    pub created_at: DateTime<Utc>,
}

/// Keeps tickets in a Vec. When a catalog is attached, tickets are priced
/// from the offering and unknown service ids are rejected.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<Vec<StoredTicket>>>,
    catalog: Option<Arc<InMemoryCatalog>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: Arc<InMemoryCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub async fn get(&self, ticket_id: &str) -> Option<StoredTicket> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| t.receipt.ticket_id == ticket_id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.tickets.read().await.len()
    }

    async fn price(&self, service_id: &str) -> Result<Option<Pricing>, ToolError> {
        let Some(catalog) = &self.catalog else {
            return Ok(None);
        };
        let offering = catalog.get(service_id).await.ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: ToolKind::TicketCreation.name().into(),
            reason: format!("unknown service '{service_id}'"),
        })?;
        Ok(offering.starting_price.map(|amount| Pricing {
            amount,
            currency: CURRENCY.into(),
        }))
    }
}

fn new_ticket_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("TKT-{}", id[..8].to_uppercase())
}

fn next_steps(priority: TicketPriority) -> Vec<String> {
    let confirmation = match priority {
        TicketPriority::Emergency => "A concierge is confirming your request right now",
        TicketPriority::Urgent => "Your concierge will confirm availability within the hour",
        TicketPriority::Standard => "Your concierge will confirm availability within 24 hours",
    };
    vec![
        confirmation.to_string(),
        "You will receive the final itinerary and pricing for approval".to_string(),
    ]
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(&self, params: &TicketParams) -> Result<TicketReceipt, ToolError> {
        let service_id = params
            .service_id
            .as_deref()
            .ok_or_else(|| ToolError::InvalidArguments("missing service id".into()))?;
        let pricing = self.price(service_id).await?;

        let receipt = TicketReceipt {
            ticket_id: new_ticket_id(),
            pricing,
            next_steps: next_steps(params.priority),
        };
        info!(
            ticket_id = %receipt.ticket_id,
            member_id = %params.member_id,
            service_id,
            priority = ?params.priority,
            "Ticket created"
        );
        self.tickets.write().await.push(StoredTicket {
            receipt: receipt.clone(),
            params: params.clone(),
            created_at: Utc::now(),
        });
        Ok(receipt)
    }
}
