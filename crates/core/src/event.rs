//! Domain events for decoupled observation of the fulfilment cycle.
//!
//! Events are published at every stage transition. Subscribers (audit,
//! dashboards, tests) react without the agent loop knowing about them.

use crate::category::{ServiceCategory, Urgency};
use crate::execution::ExecutionStrategy;
use crate::goal::RetryApproach;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A member request entered the agent loop
    RequestReceived {
        member_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The planner produced an intent (one per PLAN pass)
    IntentPlanned {
        category: ServiceCategory,
        confidence: f64,
        urgency: Urgency,
        retry_count: u32,
        timestamp: DateTime<Utc>,
    },

    /// The executor chose a strategy
    PlanBuilt {
        strategy: ExecutionStrategy,
        steps: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool step finished
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The escalation side-channel was fired
    EscalationTriggered {
        member_id: String,
        reason: String,
        delivered: bool,
        timestamp: DateTime<Utc>,
    },

    /// The goal checker scored a cycle
    GoalValidated {
        achieved: bool,
        score: f64,
        retry_recommended: bool,
        timestamp: DateTime<Utc>,
    },

    /// Another cycle was scheduled
    RetryScheduled {
        retry_count: u32,
        approach: RetryApproach,
        timestamp: DateTime<Utc>,
    },

    /// A cycle failed outright and was converted to an emergency hand-off
    CycleFailed {
        incident_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Components can subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        if self.sender.send(Arc::new(event)).is_err() {
            trace!("Domain event dropped: no subscribers");
        }
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
