//! In-memory interaction log.

use async_trait::async_trait;
use concierge_core::error::LogError;
use concierge_core::{InteractionLog, InteractionOutcome, InteractionRecord, LogReceipt, RunLog};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LoggedInteraction {
    pub log_id: String,
    pub record: InteractionRecord,
    pub requires_follow_up: bool,
}

/// Keeps records in a Vec and member feedback in a map.
#[derive(Default)]
pub struct InMemoryInteractionLog {
    records: Arc<RwLock<Vec<LoggedInteraction>>>,
    feedback: Arc<RwLock<HashMap<String, RunLog>>>,
}

impl InMemoryInteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a satisfaction signal from the member, in `[0, 1]`.
    pub async fn record_feedback(&self, member_id: &str, satisfaction: f64) {
        let mut feedback = self.feedback.write().await;
        let entry = feedback.entry(member_id.to_string()).or_default();
        entry.satisfaction = Some(satisfaction.clamp(0.0, 1.0));
    }

    pub async fn records(&self) -> Vec<LoggedInteraction> {
        self.records.read().await.clone()
    }
}

fn log_id(outcome: &InteractionOutcome) -> String {
    let prefix = match outcome {
        InteractionOutcome::Completed { .. } => "LOG",
        InteractionOutcome::Incident { .. } => "INC",
    };
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", id[..12].to_uppercase())
}

/// Unachieved, escalated and failed interactions need a human.
fn needs_follow_up(outcome: &InteractionOutcome) -> bool {
    match outcome {
        InteractionOutcome::Completed {
            achieved,
            escalated,
            ..
        } => !achieved || *escalated,
        InteractionOutcome::Incident { .. } => true,
    }
}

#[async_trait]
impl InteractionLog for InMemoryInteractionLog {
    async fn record(&self, record: InteractionRecord) -> Result<LogReceipt, LogError> {
        let log_id = log_id(&record.outcome);
        let requires_follow_up = needs_follow_up(&record.outcome);

        if requires_follow_up {
            let mut feedback = self.feedback.write().await;
            feedback
                .entry(record.member_id.clone())
                .or_default()
                .follow_up_required = true;
        }
        debug!(log_id = %log_id, member_id = %record.member_id, requires_follow_up, "Interaction logged");

        self.records.write().await.push(LoggedInteraction {
            log_id: log_id.clone(),
            record,
            requires_follow_up,
        });
        Ok(LogReceipt {
            log_id,
            requires_follow_up,
        })
    }

    async fn latest_feedback(&self, member_id: &str) -> Option<RunLog> {
        self.feedback.read().await.get(member_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use concierge_core::ServiceCategory;

    fn completed(achieved: bool, escalated: bool) -> InteractionRecord {
        InteractionRecord {
            member_id: "m-1".into(),
            message: "book dinner".into(),
            response: Some("done".into()),
            outcome: InteractionOutcome::Completed {
                category: ServiceCategory::Events,
                achieved,
                score: if achieved { 1.0 } else { 0.4 },
                escalated,
                attempts: 1,
            },
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn achieved_needs_no_follow_up() {
        let log = InMemoryInteractionLog::new();
        let receipt = log.record(completed(true, false)).await.unwrap();
        assert!(!receipt.requires_follow_up);
        assert!(receipt.log_id.starts_with("LOG-"));
        assert!(log.latest_feedback("m-1").await.is_none());
    }

    #[tokio::test]
    async fn unachieved_or_escalated_needs_follow_up() {
        let log = InMemoryInteractionLog::new();
        assert!(log.record(completed(false, false)).await.unwrap().requires_follow_up);
        assert!(log.record(completed(true, true)).await.unwrap().requires_follow_up);
        assert!(log.latest_feedback("m-1").await.unwrap().follow_up_required);
        assert_eq!(log.records().await.len(), 2);
    }

    #[tokio::test]
    async fn incidents_get_incident_ids() {
        let log = InMemoryInteractionLog::new();
        let receipt = log
            .record(InteractionRecord {
                member_id: "m-2".into(),
                message: "anything".into(),
                response: None,
                outcome: InteractionOutcome::Incident {
                    error: "panic in executor".into(),
                },
                timestamp: Utc::now(),
            })
            .await
            .unwrap();
        assert!(receipt.log_id.starts_with("INC-"));
        assert!(receipt.requires_follow_up);
    }

    #[tokio::test]
    async fn feedback_is_clamped_and_read_back() {
        let log = InMemoryInteractionLog::new();
        log.record_feedback("m-1", 1.4).await;
        let run_log = log.latest_feedback("m-1").await.unwrap();
        assert_eq!(run_log.satisfaction, Some(1.0));
        assert!(run_log.member_satisfied());
    }
}
