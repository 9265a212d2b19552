//! Member-facing response text.
//!
//! Pure functions of the cycle's artifacts: the same intent, execution
//! result and validation always produce the same text.

use concierge_core::{
    ExecutionResult, GoalValidation, Intent, MemberProfile, ServiceCategory, ToolOutput, Urgency,
};

const MAX_OPTIONS: usize = 3;
const MAX_NEXT_ACTIONS: usize = 2;
const GREETING_CONFIDENCE_CEILING: f64 = 0.5;
const PROGRESS_SCORE: f64 = 0.6;

const CLOSING: &str = "Your concierge team is here whenever you need anything else.";

/// Compose the reply for a finished cycle.
pub fn compose(
    member: &MemberProfile,
    intent: &Intent,
    result: &ExecutionResult,
    validation: &GoalValidation,
) -> String {
    if is_small_talk(intent, result) {
        return greeting(member);
    }

    let first = member.first_name();
    let label = intent.primary_category.label();
    let mut parts: Vec<String> = Vec::new();

    parts.push(if validation.achieved {
        format!("Excellent news, {first}! Your {label} request is taken care of.")
    } else if validation.score > PROGRESS_SCORE {
        format!("{first}, we've made significant progress on your {label} request.")
    } else {
        format!("Thank you for your interest in our {label} services, {first}.")
    });

    if let Some(clause) = result_clause(result) {
        parts.push(clause);
    }
    if let Some(clause) = urgency_clause(intent.urgency) {
        parts.push(clause.to_string());
    }

    let actions: Vec<&str> = result
        .next_actions
        .iter()
        .take(MAX_NEXT_ACTIONS)
        .map(String::as_str)
        .collect();
    if !actions.is_empty() {
        parts.push(format!("Next steps: {}.", actions.join("; ")));
    }

    if validation.achieved {
        if let Some(tip) = result.recommendations.first() {
            parts.push(format!("{tip}."));
        }
    }

    parts.push(CLOSING.to_string());
    parts.join(" ")
}

/// Greeting template: low-signal lifestyle chatter with nothing booked.
fn is_small_talk(intent: &Intent, result: &ExecutionResult) -> bool {
    intent.primary_category == ServiceCategory::FALLBACK
        && (intent.is_greeting()
            || (intent.confidence < GREETING_CONFIDENCE_CEILING
                && intent.service_type == Intent::GENERAL))
        && result.ticket().is_none()
        && intent.urgency != Urgency::Emergency
}

fn greeting(member: &MemberProfile) -> String {
    format!(
        "Hello {}! I'm your personal concierge. I can arrange private aviation, \
         exclusive events, brand development, investment introductions, community \
         connections and lifestyle services. What can I help you with today?",
        member.first_name()
    )
}

fn result_clause(result: &ExecutionResult) -> Option<String> {
    if let Some(ticket) = result.ticket() {
        let mut clause = format!("Your booking reference is {}", ticket.ticket_id);
        if let Some(pricing) = &ticket.pricing {
            clause.push_str(&format!(
                ", with pricing from {} {:.0}",
                pricing.currency, pricing.amount
            ));
        }
        clause.push('.');
        return Some(clause);
    }

    match &result.final_result {
        Some(ToolOutput::ServiceLookup(found)) if !found.items.is_empty() => {
            let names: Vec<&str> = found
                .items
                .iter()
                .take(MAX_OPTIONS)
                .map(|o| o.name.as_str())
                .collect();
            Some(format!("Here are the options we've curated for you: {}.", join_names(&names)))
        }
        _ => None,
    }
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn urgency_clause(urgency: Urgency) -> Option<&'static str> {
    match urgency {
        Urgency::Emergency => {
            Some("This has been flagged as an emergency and our team is treating it as top priority.")
        }
        Urgency::Urgent => Some("We're treating this as urgent."),
        Urgency::Standard => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::tool::Pricing;
    use concierge_core::{
        CatalogSearchResult, ExecutionPlan, ExecutionStep, ExecutionStrategy, ExtractedEntities,
        MemberTier, ServiceOffering, ServiceTier, StepResult, StepStatus, TicketParams,
        TicketPriority, TicketReceipt, ToolParams,
    };

    fn member() -> MemberProfile {
        MemberProfile::new("m-1", "Alex Morgan", MemberTier::Premium)
    }

    fn intent(category: ServiceCategory, confidence: f64, service_type: &str) -> Intent {
        Intent {
            primary_category: category,
            secondary_categories: Vec::new(),
            service_type: service_type.into(),
            urgency: Urgency::Standard,
            confidence,
            extracted_entities: ExtractedEntities::default(),
            suggested_tier: ServiceTier::Enhanced,
        }
    }

    fn result(steps: Vec<ExecutionStep>, final_result: Option<ToolOutput>) -> ExecutionResult {
        ExecutionResult {
            plan: ExecutionPlan {
                steps: steps.clone(),
                strategy: ExecutionStrategy::DirectFulfillment,
                expected_outcome: String::new(),
                fallback_options: Vec::new(),
            },
            success: !steps.is_empty(),
            executed_steps: steps,
            final_result,
            recommendations: vec!["Try the tasting menu".into()],
            next_actions: vec!["First".into(), "Second".into(), "Third".into()],
            escalation_needed: false,
        }
    }

    fn ticket_step() -> ExecutionStep {
        let mut step = ExecutionStep::pending(ToolParams::TicketCreation(TicketParams {
            member_id: "m-1".into(),
            service_id: Some("svc".into()),
            requirements: Default::default(),
            priority: TicketPriority::Standard,
        }));
        step.status = StepStatus::Completed;
        step.result = Some(StepResult::Output(ToolOutput::Ticket(TicketReceipt {
            ticket_id: "TKT-ABC".into(),
            pricing: Some(Pricing {
                amount: 12_000.0,
                currency: "USD".into(),
            }),
            next_steps: Vec::new(),
        })));
        step
    }

    fn validation(achieved: bool, score: f64) -> GoalValidation {
        GoalValidation {
            achieved,
            score,
            criteria_results: Vec::new(),
            missing_elements: Vec::new(),
            retry_recommended: false,
            retry_strategy: None,
        }
    }

    fn options(names: &[&str]) -> ToolOutput {
        ToolOutput::ServiceLookup(CatalogSearchResult {
            total_found: names.len(),
            items: names
                .iter()
                .map(|n| ServiceOffering {
                    id: n.to_lowercase(),
                    name: (*n).into(),
                    category: ServiceCategory::Events,
                    tier: ServiceTier::Basic,
                    starting_price: None,
                    tags: Vec::new(),
                })
                .collect(),
        })
    }

    #[test]
    fn greeting_template() {
        let text = compose(
            &member(),
            &intent(ServiceCategory::Lifestyle, 0.8, Intent::GREETING),
            &result(Vec::new(), None),
            &validation(false, 0.0),
        );
        assert!(text.starts_with("Hello Alex!"));
    }

    #[test]
    fn low_confidence_general_lifestyle_is_small_talk() {
        let text = compose(
            &member(),
            &intent(ServiceCategory::Lifestyle, 0.3, Intent::GENERAL),
            &result(Vec::new(), None),
            &validation(false, 0.1),
        );
        assert!(text.starts_with("Hello Alex!"));

        let mut emergency = intent(ServiceCategory::Lifestyle, 0.3, Intent::GENERAL);
        emergency.urgency = Urgency::Emergency;
        let text = compose(&member(), &emergency, &result(Vec::new(), None), &validation(false, 0.1));
        assert!(text.contains("emergency"));
    }

    #[test]
    fn achieved_ticket_response() {
        let mut jet = intent(ServiceCategory::Transportation, 1.0, "private_aviation");
        jet.urgency = Urgency::Urgent;
        let text = compose(
            &member(),
            &jet,
            &result(vec![ticket_step()], None),
            &validation(true, 0.9),
        );
        assert!(text.starts_with("Excellent news, Alex!"));
        assert!(text.contains("TKT-ABC, with pricing from USD 12000."));
        assert!(text.contains("urgent"));
        assert!(text.contains("Next steps: First; Second."));
        assert!(!text.contains("Third"));
        assert!(text.contains("Try the tasting menu."));
        assert!(text.ends_with(CLOSING));
    }

    #[test]
    fn progress_response_lists_options_without_tip() {
        let text = compose(
            &member(),
            &intent(ServiceCategory::Events, 0.7, "dining_reservation"),
            &result(Vec::new(), Some(options(&["Alpha", "Beta", "Gamma", "Delta"]))),
            &validation(false, 0.7),
        );
        assert!(text.starts_with("Alex, we've made significant progress"));
        assert!(text.contains("Alpha, Beta and Gamma."));
        assert!(!text.contains("Delta"));
        assert!(!text.contains("tasting menu"));
    }

    #[test]
    fn low_score_gets_interest_opener() {
        let text = compose(
            &member(),
            &intent(ServiceCategory::Investments, 0.9, "real_estate"),
            &result(Vec::new(), None),
            &validation(false, 0.2),
        );
        assert!(text.starts_with("Thank you for your interest in our investment services"));
    }

    #[test]
    fn names_join_naturally() {
        assert_eq!(join_names(&["A"]), "A");
        assert_eq!(join_names(&["A", "B"]), "A and B");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B and C");
    }
}
