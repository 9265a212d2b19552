//! Strategy selection, plan construction and step execution.
//!
//! The executor turns an [`Intent`] into an [`ExecutionPlan`], runs the
//! plan's steps strictly in order against the [`ToolSet`], and summarises
//! what happened. A failing step never aborts the run: the error is kept on
//! the step, and a failed ticket (or any failure on an emergency) fires a
//! best-effort escalation to the concierge desk.

use chrono::Utc;
use concierge_config::ExecutorConfig;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::tool::{LookupParams, SearchParams, TicketRequirements};
use concierge_core::{
    ConversationTurn, ExecutionPlan, ExecutionResult, ExecutionStep, ExecutionStrategy, Intent,
    MemberProfile, Notification, NotificationUrgency, RetryApproach, Role, ServiceCategory,
    StepResult, StepStatus, TicketParams, ToolKind, ToolOutput, ToolParams, ToolSet, Urgency,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Builds and runs execution plans.
pub struct Executor {
    tools: ToolSet,
    config: ExecutorConfig,
    event_bus: Arc<EventBus>,
}

impl Executor {
    pub fn new(tools: ToolSet, config: ExecutorConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            tools,
            config,
            event_bus,
        }
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Pick a strategy from the intent alone.
    pub fn select_strategy(&self, intent: &Intent) -> ExecutionStrategy {
        if intent.confidence > self.config.direct_threshold && has_required_entities(intent) {
            ExecutionStrategy::DirectFulfillment
        } else if intent.confidence > self.config.guided_threshold {
            ExecutionStrategy::GuidedCollection
        } else if intent.urgency == Urgency::Emergency
            || intent.confidence < self.config.escalation_threshold
        {
            ExecutionStrategy::Escalation
        } else {
            ExecutionStrategy::Research
        }
    }

    /// Build the plan for `intent`. A retry tag on `original_message`
    /// adjusts the plan the way the goal checker asked for.
    pub fn build_plan(
        &self,
        intent: &Intent,
        member: &MemberProfile,
        history: &[ConversationTurn],
        original_message: &str,
    ) -> ExecutionPlan {
        let directive = RetryApproach::detect(original_message);
        let request = RetryApproach::strip_tags(original_message);

        let strategy = match directive {
            Some(RetryApproach::Escalate) => ExecutionStrategy::Escalation,
            Some(RetryApproach::CollectMoreInfo) => ExecutionStrategy::GuidedCollection,
            _ => self.select_strategy(intent),
        };

        let search_term = match directive {
            Some(RetryApproach::SameTools) => None,
            _ => search_term(intent),
        };
        let lookup_tier = match directive {
            Some(RetryApproach::AlternativeTools) => intent.suggested_tier.lower(),
            _ => intent.suggested_tier,
        };
        let lookup = |tier, search_term| {
            ExecutionStep::pending(ToolParams::ServiceLookup(LookupParams {
                category: intent.primary_category,
                tier,
                search_term,
            }))
        };

        let steps = match strategy {
            ExecutionStrategy::DirectFulfillment => {
                let follow_on = if directive == Some(RetryApproach::AlternativeTools) {
                    self.notification_step(
                        intent,
                        member,
                        format!(
                            "{} asked for {} and automatic booking did not go through. \
                             Please offer alternatives: {request}",
                            member.name,
                            intent.primary_category.label()
                        ),
                    )
                } else {
                    ExecutionStep::pending(ToolParams::TicketCreation(TicketParams {
                        member_id: member.member_id.clone(),
                        service_id: None,
                        requirements: requirements(intent, &request),
                        priority: intent.urgency.into(),
                    }))
                };
                vec![lookup(lookup_tier, search_term), follow_on]
            }
            ExecutionStrategy::GuidedCollection => vec![lookup(lookup_tier, search_term)],
            ExecutionStrategy::Escalation => {
                let mut message = format!(
                    "{} ({}) needs help with a {} request: {request}",
                    member.name,
                    member.tier,
                    intent.primary_category.label()
                );
                if let Some(earlier) = last_member_turn(history) {
                    message.push_str(&format!(" (earlier: {earlier})"));
                }
                vec![self.notification_step(intent, member, message)]
            }
            ExecutionStrategy::Research => {
                let query = if request.is_empty() {
                    intent.primary_category.label().to_string()
                } else {
                    request.clone()
                };
                vec![
                    ExecutionStep::pending(ToolParams::WebSearch(SearchParams { query })),
                    lookup(intent.suggested_tier.lower(), search_term),
                ]
            }
        };

        ExecutionPlan {
            steps,
            strategy,
            expected_outcome: expected_outcome(strategy).into(),
            fallback_options: fallback_options(strategy),
        }
    }

    fn notification_step(
        &self,
        intent: &Intent,
        member: &MemberProfile,
        message: String,
    ) -> ExecutionStep {
        ExecutionStep::pending(ToolParams::HumanNotification(Notification {
            message,
            urgency: intent.urgency.into(),
            category: intent.primary_category,
            member: member.clone(),
        }))
    }

    /// Build and run a plan.
    pub async fn execute(
        &self,
        intent: &Intent,
        member: &MemberProfile,
        history: &[ConversationTurn],
        original_message: &str,
    ) -> ExecutionResult {
        let plan = self.build_plan(intent, member, history, original_message);
        info!(
            member_id = %member.member_id,
            strategy = %plan.strategy,
            steps = plan.steps.len(),
            "Executing plan"
        );
        self.event_bus.publish(DomainEvent::PlanBuilt {
            strategy: plan.strategy,
            steps: plan.steps.len(),
            timestamp: Utc::now(),
        });

        let mut steps = plan.steps.clone();
        let mut escalation_needed = false;

        for i in 0..steps.len() {
            let resolved_service = resolve_service_id(&steps[..i], &self.config.default_service_id);
            let step = &mut steps[i];
            if let ToolParams::TicketCreation(params) = &mut step.parameters {
                if params.service_id.is_none() {
                    params.service_id = Some(resolved_service);
                }
            }

            step.status = StepStatus::Executing;
            step.timestamp = Utc::now();
            let start = Instant::now();
            let outcome = self.tools.invoke(&step.parameters).await;
            step.execution_time_ms = start.elapsed().as_millis() as u64;

            let success = outcome.is_ok();
            match outcome {
                Ok(output) => {
                    step.status = StepStatus::Completed;
                    step.result = Some(StepResult::Output(output));
                }
                Err(e) => {
                    warn!(tool = %step.tool, error = %e, "Step failed");
                    step.status = StepStatus::Failed;
                    step.result = Some(StepResult::Error(e.to_string()));

                    if step.tool == ToolKind::TicketCreation || intent.urgency == Urgency::Emergency
                    {
                        let reason = format!("{} failed: {e}", step.tool);
                        self.escalate(intent, member, &reason).await;
                        escalation_needed = true;
                    }
                }
            }

            self.event_bus.publish(DomainEvent::ToolExecuted {
                tool_name: step.tool.name().into(),
                success,
                duration_ms: step.execution_time_ms,
                timestamp: Utc::now(),
            });
        }

        let final_result = steps
            .iter()
            .rev()
            .filter(|s| matches!(s.tool, ToolKind::TicketCreation | ToolKind::ServiceLookup))
            .find_map(|s| s.output().cloned());
        let success = steps.iter().any(ExecutionStep::is_completed);
        let escalated =
            escalation_needed || steps.iter().any(|s| s.tool == ToolKind::HumanNotification && s.is_completed());

        let recommendations = recommendations(intent, &steps);
        let next_actions = next_actions(&steps, escalated);

        debug!(
            success,
            escalation_needed,
            failed = steps.iter().filter(|s| s.is_failed()).count(),
            "Plan finished"
        );

        ExecutionResult {
            plan,
            executed_steps: steps,
            final_result,
            success,
            recommendations,
            next_actions,
            escalation_needed,
        }
    }

    /// Best-effort side call to the concierge desk. Never fails.
    async fn escalate(&self, intent: &Intent, member: &MemberProfile, reason: &str) {
        let urgency = if intent.urgency == Urgency::Emergency {
            NotificationUrgency::Critical
        } else {
            NotificationUrgency::High
        };
        let notification = Notification {
            message: format!(
                "Automatic escalation for {} ({} request): {reason}",
                member.name,
                intent.primary_category.label()
            ),
            urgency,
            category: intent.primary_category,
            member: member.clone(),
        };
        let receipt = self.tools.notifier().notify(&notification).await;
        if !receipt.sent {
            warn!(
                member_id = %member.member_id,
                channels = ?receipt.channels_attempted,
                "Escalation notification not delivered"
            );
        }
        self.event_bus.publish(DomainEvent::EscalationTriggered {
            member_id: member.member_id.clone(),
            reason: reason.to_string(),
            delivered: receipt.sent,
            timestamp: Utc::now(),
        });
    }
}

/// Entities a category needs before it can be booked directly.
fn has_required_entities(intent: &Intent) -> bool {
    let e = &intent.extracted_entities;
    match intent.primary_category {
        ServiceCategory::Transportation => !e.dates.is_empty() && !e.locations.is_empty(),
        ServiceCategory::Events => !e.dates.is_empty(),
        ServiceCategory::BrandDevelopment
        | ServiceCategory::Investments
        | ServiceCategory::Community
        | ServiceCategory::Lifestyle => true,
    }
}

fn search_term(intent: &Intent) -> Option<String> {
    match intent.service_type.as_str() {
        Intent::GENERAL | Intent::GREETING => None,
        other => Some(other.to_string()),
    }
}

fn requirements(intent: &Intent, request: &str) -> TicketRequirements {
    let e = &intent.extracted_entities;
    let origin = (e.locations.len() > 1).then(|| e.locations[0].clone());
    TicketRequirements {
        date: e.dates.first().cloned(),
        origin,
        destination: e.locations.last().cloned(),
        passenger_count: e.headcount(),
        service_type: intent.service_type.clone(),
        preferences: e.preferences.clone(),
        notes: request.to_string(),
    }
}

fn last_member_turn(history: &[ConversationTurn]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::Member)
        .map(|t| t.content.as_str())
}

/// First offering of the latest completed lookup, else the default.
fn resolve_service_id(earlier: &[ExecutionStep], default: &str) -> String {
    earlier
        .iter()
        .rev()
        .find_map(|s| match s.output() {
            Some(ToolOutput::ServiceLookup(found)) => found.items.first().map(|o| o.id.clone()),
            _ => None,
        })
        .unwrap_or_else(|| default.to_string())
}

fn expected_outcome(strategy: ExecutionStrategy) -> &'static str {
    match strategy {
        ExecutionStrategy::DirectFulfillment => "Service booked and ticket issued",
        ExecutionStrategy::GuidedCollection => "Curated options presented for the member to choose from",
        ExecutionStrategy::Escalation => "Request handed to a concierge team member",
        ExecutionStrategy::Research => "Background research and broader options gathered",
    }
}

fn fallback_options(strategy: ExecutionStrategy) -> Vec<String> {
    let options: &[&str] = match strategy {
        ExecutionStrategy::DirectFulfillment => {
            &["Present options without booking", "Escalate to the concierge team"]
        }
        ExecutionStrategy::GuidedCollection => &["Ask the member for more details", "Escalate to the concierge team"],
        ExecutionStrategy::Escalation => &["Retry the notification on another channel"],
        ExecutionStrategy::Research => &["Ask the member to clarify the request", "Escalate to the concierge team"],
    };
    options.iter().map(|o| (*o).to_string()).collect()
}

fn recommendations(intent: &Intent, steps: &[ExecutionStep]) -> Vec<String> {
    let mut out = Vec::new();
    if intent.primary_category == ServiceCategory::Transportation
        && intent.suggested_tier == concierge_core::ServiceTier::Enhanced
    {
        out.push(
            "Upgrading to premium adds priority availability and a dedicated trip coordinator"
                .to_string(),
        );
    }
    if intent.primary_category == ServiceCategory::Events && intent.confidence < 0.7 {
        out.push(
            "Share the date, party size and any venue preferences so we can secure the right booking"
                .to_string(),
        );
    }
    if steps.iter().any(ExecutionStep::is_failed) {
        out.push("A concierge team member will follow up personally to complete this request".to_string());
    }
    if !intent.secondary_categories.is_empty() {
        let labels: Vec<&str> = intent.secondary_categories.iter().map(|c| c.label()).collect();
        out.push(format!("We can also help with {} for this occasion", labels.join(" and ")));
    }
    out
}

fn next_actions(steps: &[ExecutionStep], escalated: bool) -> Vec<String> {
    let mut out = Vec::new();
    if escalated {
        out.push("A member of the concierge team has been alerted and will contact you shortly".to_string());
        out.push("Reply here with anything urgent they should know".to_string());
    }

    let ticket = steps.iter().rev().find_map(|s| match s.output() {
        Some(ToolOutput::Ticket(receipt)) => Some(receipt),
        _ => None,
    });
    let lookup_done = steps
        .iter()
        .any(|s| s.tool == ToolKind::ServiceLookup && s.is_completed());

    if let Some(receipt) = ticket {
        out.push(format!("Keep reference {} for this booking", receipt.ticket_id));
        out.extend(receipt.next_steps.iter().cloned());
        out.push("Quote your reference any time to check progress".to_string());
    } else if lookup_done {
        out.push("Review the curated options".to_string());
        out.push("Tell us which option you prefer or what to adjust".to_string());
        out.push("Confirm your choice and we will book it".to_string());
    }
    out
}
