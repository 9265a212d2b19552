//! Success criteria, goal validation and retry strategies.

use crate::execution::ExecutionResult;
use crate::interaction::RunLog;
use crate::tool::{ToolKind, ToolOutput};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of success predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    ServiceFound,
    TicketCreated,
    NotificationSent,
    HumanEscalated,
    MemberSatisfied,
}

impl CriterionKind {
    /// Evaluate the predicate. Pure: reads only its arguments.
    pub fn holds(&self, result: &ExecutionResult, run_log: Option<&RunLog>) -> bool {
        match self {
            CriterionKind::ServiceFound => result.executed_steps.iter().any(|s| {
                matches!(s.output(), Some(ToolOutput::ServiceLookup(r)) if r.total_found >= 1)
            }),
            CriterionKind::TicketCreated => result.executed_steps.iter().any(|s| {
                matches!(s.output(), Some(ToolOutput::Ticket(t)) if !t.ticket_id.is_empty())
            }),
            CriterionKind::NotificationSent => result.executed_steps.iter().any(|s| {
                s.tool == ToolKind::HumanNotification
                    && matches!(s.output(), Some(ToolOutput::Notification(n)) if n.sent)
            }),
            CriterionKind::HumanEscalated => result.escalated(),
            CriterionKind::MemberSatisfied => run_log.is_some_and(RunLog::member_satisfied),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriterion {
    pub kind: CriterionKind,
    pub description: String,
    /// In `[0, 1]`
    pub weight: f64,
}

impl SuccessCriterion {
    pub fn new(kind: CriterionKind, description: impl Into<String>, weight: f64) -> Self {
        Self {
            kind,
            description: description.into(),
            weight,
        }
    }

    pub fn evaluate(&self, result: &ExecutionResult, run_log: Option<&RunLog>) -> bool {
        self.kind.holds(result, run_log)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub criterion: SuccessCriterion,
    pub passed: bool,
    pub impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryApproach {
    SameTools,
    AlternativeTools,
    Escalate,
    CollectMoreInfo,
}

impl RetryApproach {
    const ALL: [RetryApproach; 4] = [
        RetryApproach::SameTools,
        RetryApproach::AlternativeTools,
        RetryApproach::Escalate,
        RetryApproach::CollectMoreInfo,
    ];

    /// The tag appended to the outbound message when retrying.
    pub fn tag(&self) -> &'static str {
        match self {
            RetryApproach::SameTools => "[Retry: broadened search criteria]",
            RetryApproach::AlternativeTools => "[Retry: alternative service options]",
            RetryApproach::Escalate => "[Retry: escalated handling]",
            RetryApproach::CollectMoreInfo => "[Retry: additional details requested]",
        }
    }

    /// Append this approach's tag to `message`, keeping the original text.
    pub fn apply(&self, message: &str) -> String {
        format!("{message} {}", self.tag())
    }

    /// The most recently appended retry tag in `message`, if any.
    pub fn detect(message: &str) -> Option<RetryApproach> {
        Self::ALL
            .iter()
            .filter_map(|a| message.rfind(a.tag()).map(|pos| (pos, *a)))
            .max_by_key(|(pos, _)| *pos)
            .map(|(_, a)| a)
    }

    /// `message` with every retry tag removed.
    pub fn strip_tags(message: &str) -> String {
        let mut out = message.to_string();
        for approach in Self::ALL {
            out = out.replace(approach.tag(), "");
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RetryApproach::SameTools => "same_tools",
            RetryApproach::AlternativeTools => "alternative_tools",
            RetryApproach::Escalate => "escalate",
            RetryApproach::CollectMoreInfo => "collect_more_info",
        }
    }
}

impl fmt::Display for RetryApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryStrategy {
    pub approach: RetryApproach,
    pub modifications: Vec<String>,
    /// In `[0, 1]`
    pub expected_improvement: f64,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalValidation {
    pub achieved: bool,
    /// In `[0, 1]`
    pub score: f64,
    pub criteria_results: Vec<CriterionResult>,
    pub missing_elements: Vec<String>,
    pub retry_recommended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_strategy: Option<RetryStrategy>,
}

impl GoalValidation {
    /// The unmet validation reported when a whole cycle failed.
    pub fn unmet(missing: impl Into<String>) -> Self {
        Self {
            achieved: false,
            score: 0.0,
            criteria_results: Vec::new(),
            missing_elements: vec![missing.into()],
            retry_recommended: false,
            retry_strategy: None,
        }
    }
}
