//! Execution plans, steps and results.

use crate::tool::{TicketReceipt, ToolKind, ToolOutput, ToolParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

/// What a finished step produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    Output(ToolOutput),
    Error(String),
}

/// One tool invocation inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub tool: ToolKind,
    pub parameters: ToolParams,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StepResult>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
}

impl ExecutionStep {
    /// A new step that has not run yet.
    pub fn pending(parameters: ToolParams) -> Self {
        Self {
            tool: parameters.kind(),
            parameters,
            status: StepStatus::Pending,
            result: None,
            timestamp: Utc::now(),
            execution_time_ms: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }

    /// The tool output, if the step completed.
    pub fn output(&self) -> Option<&ToolOutput> {
        match (&self.status, &self.result) {
            (StepStatus::Completed, Some(StepResult::Output(out))) => Some(out),
            _ => None,
        }
    }

    /// The captured error message, if the step failed.
    pub fn error(&self) -> Option<&str> {
        match &self.result {
            Some(StepResult::Error(msg)) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    DirectFulfillment,
    GuidedCollection,
    Escalation,
    Research,
}

impl ExecutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::DirectFulfillment => "direct_fulfillment",
            ExecutionStrategy::GuidedCollection => "guided_collection",
            ExecutionStrategy::Escalation => "escalation",
            ExecutionStrategy::Research => "research",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub steps: Vec<ExecutionStep>,
    pub strategy: ExecutionStrategy,
    pub expected_outcome: String,
    pub fallback_options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The plan as built, steps still pending
    pub plan: ExecutionPlan,
    /// The same steps in their terminal state
    pub executed_steps: Vec<ExecutionStep>,
    /// Output of the last completed lookup or ticket step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<ToolOutput>,
    pub success: bool,
    pub recommendations: Vec<String>,
    pub next_actions: Vec<String>,
    pub escalation_needed: bool,
}

impl ExecutionResult {
    pub fn has_completed(&self, tool: ToolKind) -> bool {
        self.executed_steps
            .iter()
            .any(|s| s.tool == tool && s.is_completed())
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &ExecutionStep> {
        self.executed_steps.iter().filter(|s| s.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }

    /// Receipt of the last completed ticket step.
    pub fn ticket(&self) -> Option<&TicketReceipt> {
        self.executed_steps.iter().rev().find_map(|s| match s.output() {
            Some(ToolOutput::Ticket(receipt)) => Some(receipt),
            _ => None,
        })
    }

    /// True once a human has been brought in, either through the escalation
    /// side-channel or a completed notification step.
    pub fn escalated(&self) -> bool {
        self.escalation_needed || self.has_completed(ToolKind::HumanNotification)
    }

    /// The synthetic result reported when a whole cycle failed.
    pub fn emergency_fallback(next_actions: Vec<String>) -> Self {
        let plan = ExecutionPlan {
            steps: Vec::new(),
            strategy: ExecutionStrategy::Escalation,
            expected_outcome: "Immediate hand-off to the concierge team".into(),
            fallback_options: Vec::new(),
        };
        Self {
            plan,
            executed_steps: Vec::new(),
            final_result: None,
            success: false,
            recommendations: Vec::new(),
            next_actions,
            escalation_needed: true,
        }
    }
}
