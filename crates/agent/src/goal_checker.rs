//! Goal validation: did the execution actually do what the member needed?
//!
//! Each category has a goal definition made of weighted criteria. Criteria
//! weighted at or above the required weight must pass; the rest earn
//! partial credit when they miss. A missed optional criterion never blocks
//! achievement once the required core is met.

use concierge_config::GoalConfig;
use concierge_core::{
    CriterionKind, CriterionResult, ExecutionResult, ExecutionStep, GoalValidation, Intent,
    RetryApproach, RetryStrategy, RunLog, ServiceCategory, SuccessCriterion, ToolKind,
};
use tracing::debug;

/// What success means for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDefinition {
    pub objective: String,
    pub criteria: Vec<SuccessCriterion>,
}

impl GoalDefinition {
    /// The built-in definition for `category`.
    pub fn for_category(category: ServiceCategory) -> Self {
        use CriterionKind::*;
        let (objective, criteria) = match category {
            ServiceCategory::Transportation => (
                "Transport arranged and booked",
                vec![
                    SuccessCriterion::new(ServiceFound, "Suitable transport option found", 0.8),
                    SuccessCriterion::new(TicketCreated, "Booking ticket created", 0.9),
                    SuccessCriterion::new(MemberSatisfied, "Member satisfied with the arrangement", 0.5),
                ],
            ),
            ServiceCategory::Events => (
                "Access or reservation secured",
                vec![
                    SuccessCriterion::new(ServiceFound, "Event or venue option found", 0.9),
                    SuccessCriterion::new(TicketCreated, "Reservation ticket created", 0.6),
                    SuccessCriterion::new(MemberSatisfied, "Member satisfied with the options", 0.5),
                ],
            ),
            ServiceCategory::BrandDevelopment => (
                "Brand engagement opened with a specialist",
                vec![SuccessCriterion::new(TicketCreated, "Engagement ticket created", 0.9)],
            ),
            ServiceCategory::Investments => (
                "Investment opportunity or advisor introduced",
                vec![
                    SuccessCriterion::new(ServiceFound, "Relevant investment service found", 0.8),
                    SuccessCriterion::new(HumanEscalated, "Advisor brought in", 0.6),
                ],
            ),
            ServiceCategory::Community => (
                "Member connected with the community",
                vec![
                    SuccessCriterion::new(ServiceFound, "Community offering found", 0.8),
                    SuccessCriterion::new(MemberSatisfied, "Member satisfied with the connection", 0.4),
                ],
            ),
            ServiceCategory::Lifestyle => (
                "Lifestyle request handled",
                vec![
                    SuccessCriterion::new(ServiceFound, "Lifestyle service found", 0.8),
                    SuccessCriterion::new(MemberSatisfied, "Member satisfied", 0.5),
                    SuccessCriterion::new(HumanEscalated, "Concierge involved personally", 0.4),
                ],
            ),
        };
        Self {
            objective: objective.into(),
            criteria,
        }
    }
}

/// Scores execution results against goal definitions.
#[derive(Debug, Clone, Default)]
pub struct GoalChecker {
    config: GoalConfig,
}

impl GoalChecker {
    pub fn new(config: GoalConfig) -> Self {
        Self { config }
    }

    fn is_required(&self, criterion: &SuccessCriterion) -> bool {
        criterion.weight >= self.config.required_weight
    }

    /// Validate against the built-in definition for the intent's category.
    pub fn validate(
        &self,
        intent: &Intent,
        result: &ExecutionResult,
        run_log: Option<&RunLog>,
    ) -> GoalValidation {
        let definition = GoalDefinition::for_category(intent.primary_category);
        self.validate_against(&definition, result, run_log)
    }

    pub fn validate_against(
        &self,
        definition: &GoalDefinition,
        result: &ExecutionResult,
        run_log: Option<&RunLog>,
    ) -> GoalValidation {
        let criteria_results: Vec<CriterionResult> = definition
            .criteria
            .iter()
            .map(|criterion| {
                let passed = criterion.evaluate(result, run_log);
                let impact = if passed {
                    criterion.weight
                } else if !self.is_required(criterion) {
                    self.config.optional_credit * criterion.weight
                } else {
                    0.0
                };
                CriterionResult {
                    criterion: criterion.clone(),
                    passed,
                    impact,
                }
            })
            .collect();

        let total_weight: f64 = criteria_results.iter().map(|r| r.criterion.weight).sum();
        let score = if total_weight > 0.0 {
            let earned: f64 = criteria_results.iter().map(|r| r.impact).sum();
            (earned / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let (required, optional): (Vec<&CriterionResult>, Vec<&CriterionResult>) =
            criteria_results.iter().partition(|r| self.is_required(&r.criterion));
        let required_passed = required.iter().filter(|r| r.passed).count();
        let all_required = required_passed == required.len();
        let required_ratio = if required.is_empty() {
            1.0
        } else {
            required_passed as f64 / required.len() as f64
        };
        let optional_passed = optional.iter().any(|r| r.passed);

        let mostly_required = required_ratio >= self.config.required_ratio;
        let achieved = (all_required && score >= self.config.achieved_score)
            || (mostly_required && score >= self.config.partial_score && optional_passed)
            || (all_required && score >= self.config.partial_score)
            || (mostly_required && score >= self.config.achieved_score);

        let missing_elements: Vec<String> = required
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.criterion.description.clone())
            .collect();

        let retry_recommended = !achieved && !result.escalated() && self.worth_retrying(score, result);
        let retry_strategy = retry_recommended.then(|| retry_strategy(result, &missing_elements));

        debug!(
            objective = %definition.objective,
            score,
            achieved,
            retry_recommended,
            "Goal validated"
        );

        GoalValidation {
            achieved,
            score,
            criteria_results,
            missing_elements,
            retry_recommended,
            retry_strategy,
        }
    }

    /// Gray-zone score, or partial progress next to a failure.
    fn worth_retrying(&self, score: f64, result: &ExecutionResult) -> bool {
        let gray_zone = score >= self.config.partial_score && score < self.config.achieved_score;
        let partial_progress = result.executed_steps.iter().any(ExecutionStep::is_completed)
            && result.has_failures();
        gray_zone || partial_progress
    }
}

fn retry_strategy(result: &ExecutionResult, missing: &[String]) -> RetryStrategy {
    let failed: Vec<&ExecutionStep> = result.failed_steps().collect();

    let (approach, modifications, expected_improvement, max_attempts) = if failed.is_empty() {
        let mut mods = vec!["Ask the member for the missing details".to_string()];
        mods.extend(missing.iter().map(|m| format!("Still needed: {m}")));
        (RetryApproach::CollectMoreInfo, mods, 0.3, 2)
    } else if failed.iter().any(|s| s.tool == ToolKind::TicketCreation) {
        (
            RetryApproach::AlternativeTools,
            vec![
                "Look at the next tier down".to_string(),
                "Hand the booking to a concierge instead of ticketing automatically".to_string(),
            ],
            0.4,
            2,
        )
    } else if failed.iter().all(|s| s.tool == ToolKind::ServiceLookup) {
        (
            RetryApproach::SameTools,
            vec!["Broaden the search by dropping the service-type filter".to_string()],
            0.5,
            3,
        )
    } else {
        (
            RetryApproach::Escalate,
            vec!["Route the request straight to the concierge team".to_string()],
            0.8,
            1,
        )
    };

    RetryStrategy {
        approach,
        modifications,
        expected_improvement,
        max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::tool::{LookupParams, SearchParams, TicketRequirements};
    use concierge_core::{
        CatalogSearchResult, ExecutionPlan, ExecutionStrategy, ServiceTier,
        StepResult, StepStatus, TicketParams, TicketPriority, TicketReceipt, ToolOutput, ToolParams,
    };

    fn lookup_params() -> ToolParams {
        ToolParams::ServiceLookup(LookupParams {
            category: ServiceCategory::Transportation,
            tier: ServiceTier::Enhanced,
            search_term: None,
        })
    }

    fn ticket_params() -> ToolParams {
        ToolParams::TicketCreation(TicketParams {
            member_id: "m-1".into(),
            service_id: Some("svc".into()),
            requirements: TicketRequirements::default(),
            priority: TicketPriority::Standard,
        })
    }

    fn completed(params: ToolParams, output: ToolOutput) -> ExecutionStep {
        let mut step = ExecutionStep::pending(params);
        step.status = StepStatus::Completed;
        step.result = Some(StepResult::Output(output));
        step
    }

    fn failed(params: ToolParams) -> ExecutionStep {
        let mut step = ExecutionStep::pending(params);
        step.status = StepStatus::Failed;
        step.result = Some(StepResult::Error("boom".into()));
        step
    }

    fn found(n: usize) -> ToolOutput {
        ToolOutput::ServiceLookup(CatalogSearchResult {
            total_found: n,
            items: Vec::new(),
        })
    }

    fn ticket(id: &str) -> ToolOutput {
        ToolOutput::Ticket(TicketReceipt {
            ticket_id: id.into(),
            pricing: None,
            next_steps: Vec::new(),
        })
    }

    fn result(steps: Vec<ExecutionStep>) -> ExecutionResult {
        let success = steps.iter().any(ExecutionStep::is_completed);
        ExecutionResult {
            plan: ExecutionPlan {
                steps: steps.clone(),
                strategy: ExecutionStrategy::DirectFulfillment,
                expected_outcome: String::new(),
                fallback_options: Vec::new(),
            },
            executed_steps: steps,
            final_result: None,
            success,
            recommendations: Vec::new(),
            next_actions: Vec::new(),
            escalation_needed: false,
        }
    }

    fn intent(category: ServiceCategory) -> Intent {
        Intent {
            primary_category: category,
            secondary_categories: Vec::new(),
            service_type: Intent::GENERAL.into(),
            urgency: concierge_core::Urgency::Standard,
            confidence: 0.9,
            extracted_entities: Default::default(),
            suggested_tier: ServiceTier::Enhanced,
        }
    }

    #[test]
    fn every_category_has_a_required_criterion() {
        let checker = GoalChecker::default();
        for category in ServiceCategory::ALL {
            let def = GoalDefinition::for_category(category);
            assert!(def.criteria.iter().any(|c| checker.is_required(c)), "{category}");
            assert!(def.criteria.iter().filter(|c| !checker.is_required(c)).count() <= 2);
        }
    }

    #[test]
    fn booked_transport_is_achieved() {
        let r = result(vec![
            completed(lookup_params(), found(2)),
            completed(ticket_params(), ticket("TKT-1")),
        ]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Transportation), &r, None);
        assert!(v.achieved);
        // (0.8 + 0.9 + 0.15) / 2.2
        assert!((v.score - 1.85 / 2.2).abs() < 1e-9);
        assert!(v.missing_elements.is_empty());
        assert!(!v.retry_recommended);
        assert!(v.retry_strategy.is_none());
    }

    #[test]
    fn satisfied_member_lifts_score_to_one() {
        let r = result(vec![
            completed(lookup_params(), found(1)),
            completed(ticket_params(), ticket("TKT-1")),
        ]);
        let log = RunLog {
            satisfaction: Some(0.95),
            follow_up_required: false,
        };
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Transportation), &r, Some(&log));
        assert_eq!(v.score, 1.0);
        assert!(v.achieved);
    }

    #[test]
    fn failed_only_required_criterion() {
        let r = result(vec![failed(ticket_params())]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::BrandDevelopment), &r, None);
        assert!(!v.achieved);
        assert!(v.score < 0.8);
        assert_eq!(v.missing_elements, vec!["Engagement ticket created".to_string()]);
        // Nothing completed, so no partial progress to salvage
        assert!(!v.retry_recommended);
    }

    #[test]
    fn zero_results_do_not_count_as_found() {
        let r = result(vec![completed(lookup_params(), found(0))]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Community), &r, None);
        assert!(!v.achieved);
        assert_eq!(v.missing_elements.len(), 1);
    }

    #[test]
    fn empty_definition_scores_zero() {
        let def = GoalDefinition {
            objective: "nothing".into(),
            criteria: Vec::new(),
        };
        let v = GoalChecker::default().validate_against(&def, &result(Vec::new()), None);
        assert_eq!(v.score, 0.0);
        assert!(!v.achieved);
    }

    #[test]
    fn all_required_with_perfect_score_is_achieved() {
        let def = GoalDefinition {
            objective: "found".into(),
            criteria: vec![SuccessCriterion::new(CriterionKind::ServiceFound, "found", 0.9)],
        };
        let v = GoalChecker::default().validate_against(
            &def,
            &result(vec![completed(lookup_params(), found(3))]),
            None,
        );
        assert_eq!(v.score, 1.0);
        assert!(v.achieved);
    }

    #[test]
    fn mostly_required_with_optional_is_achieved() {
        // 3 of 4 required pass, one optional passes
        let def = GoalDefinition {
            objective: "mixed".into(),
            criteria: vec![
                SuccessCriterion::new(CriterionKind::ServiceFound, "a", 0.8),
                SuccessCriterion::new(CriterionKind::ServiceFound, "b", 0.8),
                SuccessCriterion::new(CriterionKind::ServiceFound, "c", 0.8),
                SuccessCriterion::new(CriterionKind::TicketCreated, "d", 0.8),
                SuccessCriterion::new(CriterionKind::ServiceFound, "e", 0.5),
            ],
        };
        let v = GoalChecker::default().validate_against(
            &def,
            &result(vec![completed(lookup_params(), found(1))]),
            None,
        );
        // (2.4 + 0.5) / 3.7
        assert!(v.score >= 0.6);
        assert!(v.achieved);
        assert_eq!(v.missing_elements, vec!["d".to_string()]);
    }

    #[test]
    fn escalated_results_are_never_retried() {
        let mut r = result(vec![
            completed(lookup_params(), found(1)),
            failed(ticket_params()),
        ]);
        r.escalation_needed = true;
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Transportation), &r, None);
        assert!(!v.achieved);
        assert!(!v.retry_recommended);
    }

    #[test]
    fn failed_ticket_suggests_alternatives() {
        let r = result(vec![
            completed(lookup_params(), found(1)),
            failed(ticket_params()),
        ]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Transportation), &r, None);
        assert!(v.retry_recommended);
        let strategy = v.retry_strategy.unwrap();
        assert_eq!(strategy.approach, RetryApproach::AlternativeTools);
        assert_eq!(strategy.max_attempts, 2);
    }

    #[test]
    fn failed_lookups_retry_with_same_tools() {
        let search = ToolParams::WebSearch(SearchParams { query: "q".into() });
        let r = result(vec![
            completed(search, ToolOutput::Search(Vec::new())),
            failed(lookup_params()),
        ]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Lifestyle), &r, None);
        let strategy = v.retry_strategy.unwrap();
        assert_eq!(strategy.approach, RetryApproach::SameTools);
        assert_eq!(strategy.max_attempts, 3);
        assert_eq!(strategy.expected_improvement, 0.5);
    }

    #[test]
    fn mixed_failures_escalate() {
        let search = ToolParams::WebSearch(SearchParams { query: "q".into() });
        let r = result(vec![
            completed(lookup_params(), found(1)),
            failed(search),
            failed(lookup_params()),
        ]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Transportation), &r, None);
        let strategy = v.retry_strategy.unwrap();
        assert_eq!(strategy.approach, RetryApproach::Escalate);
        assert_eq!(strategy.max_attempts, 1);
    }

    #[test]
    fn met_core_with_missed_optionals_is_achieved() {
        // Events: found (0.9) + ticket missed (0.18) + satisfied missed (0.15) = 1.23 / 2.0
        let r = result(vec![completed(lookup_params(), found(1))]);
        let v = GoalChecker::default().validate(&intent(ServiceCategory::Events), &r, None);
        assert!((v.score - 0.615).abs() < 1e-9);
        // All required passed with score >= 0.6, so this is achieved
        assert!(v.achieved);
        assert!(!v.retry_recommended);
    }

    #[test]
    fn gray_zone_score_is_retried() {
        // One required of two passes: 0.8 / (0.8 + 0.5) with a custom definition
        let def = GoalDefinition {
            objective: "gray".into(),
            criteria: vec![
                SuccessCriterion::new(CriterionKind::ServiceFound, "found", 0.8),
                SuccessCriterion::new(CriterionKind::TicketCreated, "ticket", 0.1),
                SuccessCriterion::new(CriterionKind::NotificationSent, "told", 0.8),
            ],
        };
        let v = GoalChecker::default().validate_against(
            &def,
            &result(vec![completed(lookup_params(), found(1))]),
            None,
        );
        // (0.8 + 0.03 + 0) / 1.7
        assert!(v.score < 0.6);
        assert!(!v.retry_recommended);

        let def = GoalDefinition {
            objective: "gray".into(),
            criteria: vec![
                SuccessCriterion::new(CriterionKind::ServiceFound, "found", 0.9),
                SuccessCriterion::new(CriterionKind::NotificationSent, "told", 0.5),
            ],
        };
        let v = GoalChecker::default().validate_against(
            &def,
            &result(vec![completed(lookup_params(), found(1))]),
            None,
        );
        // (0.9 + 0.15) / 1.4 = 0.75, all required passed → achieved via the 0.6 branch
        assert!(v.achieved);

        let def = GoalDefinition {
            objective: "gray".into(),
            criteria: vec![
                SuccessCriterion::new(CriterionKind::ServiceFound, "found", 0.9),
                SuccessCriterion::new(CriterionKind::ServiceFound, "found again", 0.9),
                SuccessCriterion::new(CriterionKind::NotificationSent, "told", 0.8),
            ],
        };
        let v = GoalChecker::default().validate_against(
            &def,
            &result(vec![completed(lookup_params(), found(1))]),
            None,
        );
        // 1.8 / 2.6 ≈ 0.69: two thirds of required, no optional
        assert!(!v.achieved);
        assert!(v.retry_recommended);
        let strategy = v.retry_strategy.unwrap();
        assert_eq!(strategy.approach, RetryApproach::CollectMoreInfo);
        assert!(strategy.modifications.iter().any(|m| m.contains("told")));
    }
}
