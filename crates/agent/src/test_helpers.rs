//! Shared collaborators for agent tests.

use async_trait::async_trait;
use concierge_core::error::LogError;
use concierge_core::{
    CatalogSearchResult, InteractionLog, InteractionRecord, LogReceipt, MemberProfile, MemberTier,
    Notification, NotificationChannel, NotificationReceipt, RunLog, ServiceCatalog,
    ServiceCategory, ServiceTier, TicketParams, TicketReceipt, TicketStore, ToolError, ToolSet,
};
use concierge_tools::{InMemoryCatalog, InMemoryTicketStore, LogNotifier, MockSearchProvider};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The in-memory tool stack with a search provider attached.
pub fn in_memory_tools() -> ToolSet {
    let catalog = Arc::new(InMemoryCatalog::seeded());
    let tickets = InMemoryTicketStore::new().with_catalog(catalog.clone());
    ToolSet::new(catalog, Arc::new(tickets), Arc::new(LogNotifier::new()))
        .with_search(Arc::new(MockSearchProvider::default()))
}

pub fn member() -> MemberProfile {
    MemberProfile::new("m-1", "Alex Morgan", MemberTier::Premium)
}

/// Catalog with nothing in it.
pub struct EmptyCatalog;

#[async_trait]
impl ServiceCatalog for EmptyCatalog {
    async fn search(
        &self,
        _category: ServiceCategory,
        _tier: ServiceTier,
        _search_term: Option<&str>,
    ) -> Result<CatalogSearchResult, ToolError> {
        Ok(CatalogSearchResult {
            total_found: 0,
            items: Vec::new(),
        })
    }
}

/// Catalog that is always down.
#[derive(Default)]
pub struct FailingCatalog {
    calls: AtomicUsize,
}

impl FailingCatalog {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceCatalog for FailingCatalog {
    async fn search(
        &self,
        _category: ServiceCategory,
        _tier: ServiceTier,
        _search_term: Option<&str>,
    ) -> Result<CatalogSearchResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ToolError::Unavailable("catalog offline".into()))
    }
}

/// Catalog that panics mid-cycle.
pub struct PanickingCatalog;

#[async_trait]
impl ServiceCatalog for PanickingCatalog {
    async fn search(
        &self,
        _category: ServiceCategory,
        _tier: ServiceTier,
        _search_term: Option<&str>,
    ) -> Result<CatalogSearchResult, ToolError> {
        panic!("catalog index corrupted")
    }
}

/// Ticket store that remembers the service ids it was asked to book.
#[derive(Default)]
pub struct RecordingTickets {
    service_ids: Mutex<Vec<String>>,
}

impl RecordingTickets {
    pub fn service_ids(&self) -> Vec<String> {
        self.service_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketStore for RecordingTickets {
    async fn create(&self, params: &TicketParams) -> Result<TicketReceipt, ToolError> {
        let mut ids = self.service_ids.lock().unwrap();
        ids.push(params.service_id.clone().unwrap_or_default());
        Ok(TicketReceipt {
            ticket_id: format!("TKT-{:08}", ids.len()),
            pricing: None,
            next_steps: Vec::new(),
        })
    }
}

pub struct FailingTickets;

#[async_trait]
impl TicketStore for FailingTickets {
    async fn create(&self, _params: &TicketParams) -> Result<TicketReceipt, ToolError> {
        Err(ToolError::Unavailable("fully booked".into()))
    }
}

/// Notifier that counts calls and can be told to report non-delivery.
pub struct CountingNotifier {
    delivers: bool,
    messages: Mutex<Vec<String>>,
}

impl Default for CountingNotifier {
    fn default() -> Self {
        Self {
            delivers: true,
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl CountingNotifier {
    pub fn undeliverable() -> Self {
        Self {
            delivers: false,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for CountingNotifier {
    async fn notify(&self, notification: &Notification) -> NotificationReceipt {
        self.messages
            .lock()
            .unwrap()
            .push(notification.message.clone());
        NotificationReceipt {
            sent: self.delivers,
            channels_attempted: vec!["test".into()],
        }
    }
}

/// Notifier that panics on every send.
pub struct PanickingNotifier;

#[async_trait]
impl NotificationChannel for PanickingNotifier {
    async fn notify(&self, _notification: &Notification) -> NotificationReceipt {
        panic!("pager gateway exploded")
    }
}

/// Interaction log that panics when asked to store anything.
pub struct PanickingLog;

#[async_trait]
impl InteractionLog for PanickingLog {
    async fn record(&self, _record: InteractionRecord) -> Result<LogReceipt, LogError> {
        panic!("log index poisoned")
    }

    async fn latest_feedback(&self, _member_id: &str) -> Option<RunLog> {
        None
    }
}

/// Interaction log whose storage is broken.
pub struct FailingLog;

#[async_trait]
impl InteractionLog for FailingLog {
    async fn record(&self, _record: InteractionRecord) -> Result<LogReceipt, LogError> {
        Err(LogError::Storage("disk full".into()))
    }

    async fn latest_feedback(&self, _member_id: &str) -> Option<RunLog> {
        None
    }
}
