//! Tools: the external capabilities the executor can invoke.
//!
//! The tool set is closed: service lookup, ticket creation, human
//! notification and generic search. Each has a typed parameter struct and a
//! typed output, and each is backed by a collaborator trait so the runtime
//! can swap implementations (in-memory, HTTP, mocks in tests).

use crate::category::{ServiceCategory, ServiceTier, Urgency};
use crate::error::ToolError;
use crate::member::MemberProfile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The fixed set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    ServiceLookup,
    TicketCreation,
    HumanNotification,
    WebSearch,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::ServiceLookup => "service_lookup",
            ToolKind::TicketCreation => "ticket_creation",
            ToolKind::HumanNotification => "human_notification",
            ToolKind::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Parameters ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupParams {
    pub category: ServiceCategory,
    pub tier: ServiceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

/// Requirements attached to a ticket, built from extracted entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_count: Option<u32>,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
    /// The member's own words
    pub notes: String,
}

/// Ticket priority, mapped from request urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Standard,
    Urgent,
    Emergency,
}

impl From<Urgency> for TicketPriority {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Emergency => TicketPriority::Emergency,
            Urgency::Urgent => TicketPriority::Urgent,
            Urgency::Standard => TicketPriority::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketParams {
    pub member_id: String,
    /// `None` until resolved from the preceding lookup step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub requirements: TicketRequirements,
    pub priority: TicketPriority,
}

/// Urgency of a notification to the human concierge desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationUrgency {
    High,
    Critical,
}

impl From<Urgency> for NotificationUrgency {
    fn from(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Emergency => NotificationUrgency::Critical,
            Urgency::Urgent | Urgency::Standard => NotificationUrgency::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub urgency: NotificationUrgency,
    pub category: ServiceCategory,
    pub member: MemberProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// Parameters of one tool invocation; the variant decides the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolParams {
    ServiceLookup(LookupParams),
    TicketCreation(TicketParams),
    HumanNotification(Notification),
    WebSearch(SearchParams),
}

impl ToolParams {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolParams::ServiceLookup(_) => ToolKind::ServiceLookup,
            ToolParams::TicketCreation(_) => ToolKind::TicketCreation,
            ToolParams::HumanNotification(_) => ToolKind::HumanNotification,
            ToolParams::WebSearch(_) => ToolKind::WebSearch,
        }
    }
}

// ── Outputs ─────────────────────────────────────────────────────────────────

/// One offering in the service catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    pub category: ServiceCategory,
    pub tier: ServiceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSearchResult {
    pub total_found: usize,
    pub items: Vec<ServiceOffering>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketReceipt {
    pub ticket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub sent: bool,
    pub channels_attempted: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Output of a successful tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ToolOutput {
    ServiceLookup(CatalogSearchResult),
    Ticket(TicketReceipt),
    Notification(NotificationReceipt),
    Search(Vec<SearchHit>),
}

// ── Collaborators ───────────────────────────────────────────────────────────

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn search(
        &self,
        category: ServiceCategory,
        tier: ServiceTier,
        search_term: Option<&str>,
    ) -> Result<CatalogSearchResult, ToolError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create(&self, params: &TicketParams) -> Result<TicketReceipt, ToolError>;
}

/// Delivers a message to the human concierge desk.
///
/// Implementations must not fail: delivery problems are reported through
/// [`NotificationReceipt::sent`].
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(&self, notification: &Notification) -> NotificationReceipt;
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError>;
}

/// The collaborators available to the executor.
///
/// Dispatch is an exhaustive match over [`ToolParams`], so every tool in
/// the closed set has exactly one handler.
#[derive(Clone)]
pub struct ToolSet {
    catalog: Arc<dyn ServiceCatalog>,
    tickets: Arc<dyn TicketStore>,
    notifier: Arc<dyn NotificationChannel>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl ToolSet {
    pub fn new(
        catalog: Arc<dyn ServiceCatalog>,
        tickets: Arc<dyn TicketStore>,
        notifier: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            catalog,
            tickets,
            notifier,
            search: None,
        }
    }

    /// Attach a generic search provider (needed by the research strategy).
    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// The notification channel, for escalation side-calls.
    pub fn notifier(&self) -> &Arc<dyn NotificationChannel> {
        &self.notifier
    }

    /// Run one tool invocation.
    pub async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError> {
        match params {
            ToolParams::ServiceLookup(p) => self
                .catalog
                .search(p.category, p.tier, p.search_term.as_deref())
                .await
                .map(ToolOutput::ServiceLookup),
            ToolParams::TicketCreation(p) => {
                if p.service_id.is_none() {
                    return Err(ToolError::InvalidArguments(
                        "ticket creation requires a service id".into(),
                    ));
                }
                self.tickets.create(p).await.map(ToolOutput::Ticket)
            }
            ToolParams::HumanNotification(n) => {
                let receipt = self.notifier.notify(n).await;
                if receipt.sent {
                    Ok(ToolOutput::Notification(receipt))
                } else {
                    Err(ToolError::DeliveryFailed(format!(
                        "attempted channels: {}",
                        receipt.channels_attempted.join(", ")
                    )))
                }
            }
            ToolParams::WebSearch(p) => {
                let search = self
                    .search
                    .as_ref()
                    .ok_or_else(|| ToolError::NotConfigured(ToolKind::WebSearch.name().into()))?;
                search.search(&p.query).await.map(ToolOutput::Search)
            }
        }
    }
}
