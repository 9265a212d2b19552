//! The agent loop: PLAN, EXECUTE, VALIDATE, then RETRY or RESPOND.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use concierge_config::AppConfig;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::{
    AgentContext, AgentResult, ConversationTurn, ExecutionResult, GoalValidation, Intent,
    InteractionLog, InteractionOutcome, InteractionRecord, LogReceipt, MemberProfile, MemberTier,
    Notification, NotificationReceipt, NotificationUrgency, RetryApproach, ServiceCategory, ToolSet,
};
use concierge_planner::Planner;
use futures::FutureExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::executor::Executor;
use crate::goal_checker::GoalChecker;
use crate::response;

/// Artifacts of one PLAN → EXECUTE → VALIDATE pass.
struct Cycle {
    intent: Intent,
    execution_result: ExecutionResult,
    goal_validation: GoalValidation,
    retry_count: u32,
}

/// Orchestrates planner, executor and goal checker for one request.
pub struct AgentLoop {
    planner: Planner,
    executor: Executor,
    goal_checker: GoalChecker,

    /// Records outcomes and supplies member feedback
    log: Arc<dyn InteractionLog>,

    event_bus: Arc<EventBus>,

    /// Ceiling used when a request does not carry its own
    max_retries: u32,
}

impl AgentLoop {
    pub fn new(
        config: &AppConfig,
        tools: ToolSet,
        log: Arc<dyn InteractionLog>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            planner: Planner::new(config.planner.clone()),
            executor: Executor::new(tools, config.executor.clone(), event_bus.clone()),
            goal_checker: GoalChecker::new(config.goals.clone()),
            log,
            event_bus,
            max_retries: config.agent.max_retries,
        }
    }

    /// Override the default retry ceiling.
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    /// Handle one member request built from loose fields.
    #[allow(clippy::too_many_arguments)]
    pub async fn process_request(
        &self,
        member_id: &str,
        member_name: &str,
        member_tier: MemberTier,
        message: &str,
        history: Vec<ConversationTurn>,
        retry_count: Option<u32>,
        max_retries: Option<u32>,
    ) -> AgentResult {
        let member = MemberProfile::new(member_id, member_name, member_tier);
        let context = AgentContext::new(member, message)
            .with_history(history)
            .with_retry_count(retry_count.unwrap_or(0))
            .with_max_retries(max_retries.unwrap_or(self.max_retries));
        self.run(context).await
    }

    /// Run the loop to a terminal result. Never fails: a panic inside any
    /// cycle becomes an emergency hand-off.
    pub async fn run(&self, context: AgentContext) -> AgentResult {
        info!(
            member_id = %context.member.member_id,
            retry_count = context.retry_count,
            max_retries = context.max_retries,
            "Processing member request"
        );
        self.event_bus.publish(DomainEvent::RequestReceived {
            member_id: context.member.member_id.clone(),
            content_preview: context.message.chars().take(100).collect(),
            timestamp: Utc::now(),
        });

        let attempts = AtomicU32::new(0);
        let outcome = AssertUnwindSafe(self.cycles(&context, &attempts))
            .catch_unwind()
            .await;
        let attempts = attempts.load(Ordering::SeqCst);

        match outcome {
            Ok(cycle) => self.respond(&context, cycle, attempts).await,
            Err(payload) => {
                self.critical_failure(&context, panic_message(payload.as_ref()), attempts)
                    .await
            }
        }
    }

    /// One pass, then up to `max_retries - retry_count` more while the goal
    /// checker asks for them.
    async fn cycles(&self, context: &AgentContext, attempts: &AtomicU32) -> Cycle {
        let mut message = context.message.clone();
        let mut cycle = self
            .cycle(context, &message, context.retry_count, attempts)
            .await;
        let mut used: Vec<RetryApproach> = Vec::new();

        let budget = context.max_retries.saturating_sub(context.retry_count);
        for _ in 0..budget {
            let validation = &cycle.goal_validation;
            if validation.achieved || !validation.retry_recommended {
                break;
            }
            let Some(strategy) = &validation.retry_strategy else {
                break;
            };
            let approach = strategy.approach;
            let taken = used.iter().filter(|a| **a == approach).count() as u32;
            if taken >= strategy.max_attempts {
                debug!(approach = %approach, "Retry approach exhausted");
                break;
            }
            used.push(approach);

            let retry_count = cycle.retry_count + 1;
            message = approach.apply(&message);
            info!(
                member_id = %context.member.member_id,
                retry_count,
                approach = %approach,
                score = validation.score,
                "Retrying request"
            );
            self.event_bus.publish(DomainEvent::RetryScheduled {
                retry_count,
                approach,
                timestamp: Utc::now(),
            });

            cycle = self.cycle(context, &message, retry_count, attempts).await;
        }

        cycle
    }

    async fn cycle(
        &self,
        context: &AgentContext,
        message: &str,
        retry_count: u32,
        attempts: &AtomicU32,
    ) -> Cycle {
        attempts.fetch_add(1, Ordering::SeqCst);

        let intent = self
            .planner
            .plan(message, &context.conversation_history, &context.member);
        debug!(
            category = %intent.primary_category,
            service_type = %intent.service_type,
            confidence = intent.confidence,
            retry_count,
            "Intent planned"
        );
        self.event_bus.publish(DomainEvent::IntentPlanned {
            category: intent.primary_category,
            confidence: intent.confidence,
            urgency: intent.urgency,
            retry_count,
            timestamp: Utc::now(),
        });

        let execution_result = self
            .executor
            .execute(
                &intent,
                &context.member,
                &context.conversation_history,
                message,
            )
            .await;

        let feedback = self.log.latest_feedback(&context.member.member_id).await;
        let goal_validation =
            self.goal_checker
                .validate(&intent, &execution_result, feedback.as_ref());
        debug!(
            achieved = goal_validation.achieved,
            score = goal_validation.score,
            retry_recommended = goal_validation.retry_recommended,
            "Goal validated"
        );
        self.event_bus.publish(DomainEvent::GoalValidated {
            achieved: goal_validation.achieved,
            score: goal_validation.score,
            retry_recommended: goal_validation.retry_recommended,
            timestamp: Utc::now(),
        });

        Cycle {
            intent,
            execution_result,
            goal_validation,
            retry_count,
        }
    }

    async fn respond(&self, context: &AgentContext, cycle: Cycle, attempts: u32) -> AgentResult {
        let Cycle {
            intent,
            execution_result,
            goal_validation,
            retry_count,
        } = cycle;

        let response = response::compose(
            &context.member,
            &intent,
            &execution_result,
            &goal_validation,
        );

        let record = InteractionRecord {
            member_id: context.member.member_id.clone(),
            message: context.message.clone(),
            response: Some(response.clone()),
            outcome: InteractionOutcome::Completed {
                category: intent.primary_category,
                achieved: goal_validation.achieved,
                score: goal_validation.score,
                escalated: execution_result.escalated(),
                attempts,
            },
            timestamp: Utc::now(),
        };
        let requires_follow_up = match self.record(record).await {
            Some(receipt) => receipt.requires_follow_up,
            None => !goal_validation.achieved,
        };

        info!(
            member_id = %context.member.member_id,
            achieved = goal_validation.achieved,
            score = goal_validation.score,
            attempts,
            "Request complete"
        );

        AgentResult {
            success: goal_validation.achieved,
            response,
            recommendations: execution_result.recommendations.clone(),
            next_steps: execution_result.next_actions.clone(),
            requires_follow_up,
            retry_count,
            attempts,
            incident_id: None,
            intent,
            execution_result,
            goal_validation,
        }
    }

    /// Convert a failed cycle into an emergency hand-off.
    async fn critical_failure(
        &self,
        context: &AgentContext,
        error_message: String,
        attempts: u32,
    ) -> AgentResult {
        let member = &context.member;
        error!(member_id = %member.member_id, error = %error_message, "Agent cycle failed");

        let record = InteractionRecord {
            member_id: member.member_id.clone(),
            message: context.message.clone(),
            response: None,
            outcome: InteractionOutcome::Incident {
                error: error_message.clone(),
            },
            timestamp: Utc::now(),
        };
        let incident_id = match self.record(record).await {
            Some(receipt) => receipt.log_id,
            None => local_incident_id(),
        };

        let notification = Notification {
            message: format!(
                "Critical failure handling a request from {} ({}). Incident {incident_id}: {error_message}",
                member.name, member.member_id
            ),
            urgency: NotificationUrgency::Critical,
            category: ServiceCategory::FALLBACK,
            member: member.clone(),
        };
        let receipt = AssertUnwindSafe(self.executor.tools().notifier().notify(&notification))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                warn!(
                    incident_id = %incident_id,
                    error = %panic_message(payload.as_ref()),
                    "Notifier panicked during critical escalation"
                );
                NotificationReceipt {
                    sent: false,
                    channels_attempted: Vec::new(),
                }
            });
        if !receipt.sent {
            warn!(incident_id = %incident_id, "Critical escalation was not delivered");
        }
        self.event_bus.publish(DomainEvent::EscalationTriggered {
            member_id: member.member_id.clone(),
            reason: "critical_error".into(),
            delivered: receipt.sent,
            timestamp: Utc::now(),
        });
        self.event_bus.publish(DomainEvent::CycleFailed {
            incident_id: incident_id.clone(),
            error_message,
            timestamp: Utc::now(),
        });

        let next_steps = vec![
            "A senior concierge will contact you directly".to_string(),
            format!("Quote incident {incident_id} if you reach out in the meantime"),
        ];
        let response = format!(
            "I apologize, {}. Something went wrong while handling your request, and a senior \
             member of the concierge team has been alerted to help you personally. Your \
             incident reference is {incident_id}.",
            member.first_name()
        );

        AgentResult {
            success: false,
            response,
            intent: Intent::emergency_fallback(),
            execution_result: ExecutionResult::emergency_fallback(next_steps.clone()),
            goal_validation: GoalValidation::unmet("Request could not be processed"),
            recommendations: Vec::new(),
            next_steps,
            requires_follow_up: true,
            retry_count: context.retry_count,
            attempts,
            incident_id: Some(incident_id),
        }
    }

    /// Write one record to the interaction log. `None` when the log errors
    /// or panics.
    async fn record(&self, record: InteractionRecord) -> Option<LogReceipt> {
        let member_id = record.member_id.clone();
        match AssertUnwindSafe(self.log.record(record)).catch_unwind().await {
            Ok(Ok(receipt)) => Some(receipt),
            Ok(Err(e)) => {
                warn!(member_id = %member_id, error = %e, "Failed to log interaction");
                None
            }
            Err(payload) => {
                warn!(
                    member_id = %member_id,
                    error = %panic_message(payload.as_ref()),
                    "Interaction log panicked"
                );
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown failure".to_string()
    }
}

fn local_incident_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("INC-{}", id[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use concierge_core::{ExecutionStrategy, ToolOutput};
    use concierge_tools::{InMemoryCatalog, InMemoryInteractionLog, LogNotifier, MockSearchProvider};
    use tokio::sync::broadcast;

    const JET: &str = "I need a private jet from Miami to New York tomorrow for 4 passengers";
    const UNMATCHED: &str = "zxqv plorb";

    fn agent(tools: ToolSet, log: Arc<dyn InteractionLog>) -> AgentLoop {
        AgentLoop::new(&AppConfig::default(), tools, log, Arc::new(EventBus::default()))
    }

    fn research_tools(catalog: Arc<FailingCatalog>) -> ToolSet {
        ToolSet::new(
            catalog,
            Arc::new(RecordingTickets::default()),
            Arc::new(CountingNotifier::default()),
        )
        .with_search(Arc::new(MockSearchProvider::default()))
    }

    fn drain(rx: &mut broadcast::Receiver<Arc<DomainEvent>>) -> Vec<Arc<DomainEvent>> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn jet_request_is_booked_first_time() {
        let log = Arc::new(InMemoryInteractionLog::new());
        let agent = agent(in_memory_tools(), log.clone());
        let result = agent
            .process_request("m-1", "Alex Morgan", MemberTier::Premium, JET, Vec::new(), None, None)
            .await;

        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.intent.primary_category, ServiceCategory::Transportation);
        assert_eq!(
            result.execution_result.plan.strategy,
            ExecutionStrategy::DirectFulfillment
        );
        assert!(result.response.contains("TKT-"));
        assert!(!result.requires_follow_up);
        assert!(result.incident_id.is_none());
        assert_eq!(result.next_steps, result.execution_result.next_actions);
        assert_eq!(log.records().await.len(), 1);
    }

    #[tokio::test]
    async fn greeting_gets_greeting_template() {
        let agent = agent(in_memory_tools(), Arc::new(InMemoryInteractionLog::new()));
        let result = agent
            .run(AgentContext::new(member(), "Hi, how are you?"))
            .await;
        assert!(result.intent.is_greeting());
        assert!(result.response.starts_with("Hello Alex!"));
    }

    #[tokio::test]
    async fn retries_stop_at_the_ceiling() {
        let catalog = Arc::new(FailingCatalog::default());
        let agent = agent(research_tools(catalog.clone()), Arc::new(InMemoryInteractionLog::new()));
        let mut rx = agent.event_bus().subscribe();

        let result = agent.run(AgentContext::new(member(), UNMATCHED)).await;

        assert!(!result.success);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.retry_count, 2);
        assert_eq!(catalog.calls(), 3);

        let events = drain(&mut rx);
        let planned = events
            .iter()
            .filter(|e| matches!(e.as_ref(), DomainEvent::IntentPlanned { .. }))
            .count();
        assert_eq!(planned, 3);
        let approaches: Vec<RetryApproach> = events
            .iter()
            .filter_map(|e| match e.as_ref() {
                DomainEvent::RetryScheduled { approach, .. } => Some(*approach),
                _ => None,
            })
            .collect();
        assert_eq!(approaches, vec![RetryApproach::SameTools; 2]);
    }

    #[tokio::test]
    async fn no_retry_when_budget_is_spent() {
        let catalog = Arc::new(FailingCatalog::default());
        let agent = agent(research_tools(catalog.clone()), Arc::new(InMemoryInteractionLog::new()));

        let context = AgentContext::new(member(), UNMATCHED)
            .with_retry_count(2)
            .with_max_retries(2);
        let result = agent.run(context).await;

        assert_eq!(result.attempts, 1);
        assert_eq!(result.retry_count, 2);
        assert!(!result.success);
        assert!(result.goal_validation.retry_recommended);
        assert!(result.requires_follow_up);
    }

    #[tokio::test]
    async fn zero_max_retries_runs_once() {
        let catalog = Arc::new(FailingCatalog::default());
        let agent = agent(research_tools(catalog.clone()), Arc::new(InMemoryInteractionLog::new()))
            .with_max_retries(0);
        let result = agent
            .process_request("m-1", "Alex", MemberTier::Standard, UNMATCHED, Vec::new(), None, None)
            .await;
        assert_eq!(result.attempts, 1);
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn panic_becomes_emergency_hand_off() {
        let notifier = Arc::new(CountingNotifier::default());
        let tools = ToolSet::new(
            Arc::new(PanickingCatalog),
            Arc::new(RecordingTickets::default()),
            notifier.clone(),
        );
        let log = Arc::new(InMemoryInteractionLog::new());
        let agent = agent(tools, log.clone());
        let mut rx = agent.event_bus().subscribe();

        let result = agent.run(AgentContext::new(member(), JET)).await;

        assert!(!result.success);
        assert!(result.execution_result.escalation_needed);
        assert_eq!(result.intent.urgency, concierge_core::Urgency::Emergency);
        assert!(!result.goal_validation.achieved);
        assert!(result.requires_follow_up);
        assert_eq!(result.attempts, 1);

        let incident = result.incident_id.clone().unwrap();
        assert!(incident.starts_with("INC-"));
        assert!(result.response.contains(&incident));
        assert_eq!(notifier.count(), 1);
        assert!(notifier.messages()[0].contains("catalog index corrupted"));

        let records = log.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].log_id, incident);

        let failed = drain(&mut rx).into_iter().any(|e| {
            matches!(e.as_ref(), DomainEvent::CycleFailed { incident_id, .. } if *incident_id == incident)
        });
        assert!(failed);
    }

    #[tokio::test]
    async fn broken_log_still_yields_incident_id() {
        let tools = ToolSet::new(
            Arc::new(PanickingCatalog),
            Arc::new(RecordingTickets::default()),
            Arc::new(LogNotifier::new()),
        );
        let result = agent(tools, Arc::new(FailingLog))
            .run(AgentContext::new(member(), JET))
            .await;
        let incident = result.incident_id.unwrap();
        assert!(incident.starts_with("INC-"));
        assert!(result.response.contains(&incident));
    }

    #[tokio::test]
    async fn panicking_notifier_is_contained_in_hand_off() {
        let tools = ToolSet::new(
            Arc::new(InMemoryCatalog::seeded()),
            Arc::new(RecordingTickets::default()),
            Arc::new(PanickingNotifier),
        );
        let log = Arc::new(InMemoryInteractionLog::new());
        let agent = agent(tools, log.clone());
        let mut rx = agent.event_bus().subscribe();

        let context = AgentContext::new(member(), "emergency, please help");
        let outcome = AssertUnwindSafe(agent.run(context)).catch_unwind().await;
        let result = outcome.expect("run must not unwind");

        assert!(!result.success);
        assert!(result.requires_follow_up);
        let incident = result.incident_id.clone().unwrap();
        assert!(result.response.contains(&incident));
        assert_eq!(log.records().await[0].log_id, incident);

        let undelivered = drain(&mut rx).into_iter().any(|e| {
            matches!(
                e.as_ref(),
                DomainEvent::EscalationTriggered { reason, delivered: false, .. } if reason == "critical_error"
            )
        });
        assert!(undelivered);
    }

    #[tokio::test]
    async fn panicking_log_on_success_falls_back_to_achievement() {
        let outcome = AssertUnwindSafe(
            agent(in_memory_tools(), Arc::new(PanickingLog)).run(AgentContext::new(member(), JET)),
        )
        .catch_unwind()
        .await;
        let result = outcome.expect("run must not unwind");

        assert!(result.success);
        assert!(!result.requires_follow_up);
        assert!(result.incident_id.is_none());
    }

    #[tokio::test]
    async fn panicking_log_in_hand_off_gets_local_incident_id() {
        let notifier = Arc::new(CountingNotifier::default());
        let tools = ToolSet::new(
            Arc::new(PanickingCatalog),
            Arc::new(RecordingTickets::default()),
            notifier.clone(),
        );
        let outcome = AssertUnwindSafe(
            agent(tools, Arc::new(PanickingLog)).run(AgentContext::new(member(), JET)),
        )
        .catch_unwind()
        .await;
        let result = outcome.expect("run must not unwind");

        let incident = result.incident_id.unwrap();
        assert!(incident.starts_with("INC-"));
        assert_eq!(incident.len(), "INC-".len() + 12);
        assert!(result.requires_follow_up);
        assert_eq!(notifier.count(), 1);
        assert!(notifier.messages()[0].contains(&incident));
    }

    #[tokio::test]
    async fn broken_log_falls_back_to_achievement_for_follow_up() {
        let result = agent(in_memory_tools(), Arc::new(FailingLog))
            .run(AgentContext::new(member(), JET))
            .await;
        assert!(result.success);
        assert!(!result.requires_follow_up);
        assert!(matches!(
            result.execution_result.final_result,
            Some(ToolOutput::Ticket(_))
        ));
    }

    #[tokio::test]
    async fn member_feedback_feeds_validation() {
        let log = Arc::new(InMemoryInteractionLog::new());
        log.record_feedback("m-1", 0.9).await;
        let catalog = Arc::new(InMemoryCatalog::seeded());
        let tools = ToolSet::new(
            catalog,
            Arc::new(RecordingTickets::default()),
            Arc::new(CountingNotifier::default()),
        );
        let result = agent(tools, log)
            .run(AgentContext::new(member(), JET))
            .await;
        let satisfied = result
            .goal_validation
            .criteria_results
            .iter()
            .any(|c| c.criterion.kind == concierge_core::CriterionKind::MemberSatisfied && c.passed);
        assert!(satisfied);
        assert!((result.goal_validation.score - 1.0).abs() < 1e-9);
    }
}
