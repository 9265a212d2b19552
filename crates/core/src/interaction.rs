//! Interaction log: the downstream record of every handled request.
//!
//! The agent loop writes one record per finished request and reads the
//! member's latest feedback back as a [`RunLog`] for goal validation.

use crate::category::ServiceCategory;
use crate::error::LogError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Satisfaction at or above this counts as a satisfied member.
pub const SATISFACTION_THRESHOLD: f64 = 0.7;

/// What the log knows about a member's previous interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    /// Most recent satisfaction signal, in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction: Option<f64>,
    #[serde(default)]
    pub follow_up_required: bool,
}

impl RunLog {
    pub fn member_satisfied(&self) -> bool {
        self.satisfaction.is_some_and(|s| s >= SATISFACTION_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionOutcome {
    Completed {
        category: ServiceCategory,
        achieved: bool,
        score: f64,
        escalated: bool,
        attempts: u32,
    },
    Incident {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub member_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub outcome: InteractionOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogReceipt {
    pub log_id: String,
    pub requires_follow_up: bool,
}

#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Store a record and report whether a human should follow up.
    async fn record(&self, record: InteractionRecord) -> Result<LogReceipt, LogError>;

    /// Latest feedback known for the member, if any.
    async fn latest_feedback(&self, member_id: &str) -> Option<RunLog>;
}
