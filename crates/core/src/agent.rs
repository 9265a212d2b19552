//! Inbound and outbound envelopes of the agent loop.

use crate::execution::ExecutionResult;
use crate::goal::GoalValidation;
use crate::intent::Intent;
use crate::member::{ConversationTurn, MemberProfile};
use serde::{Deserialize, Serialize};

/// Default ceiling on retry cycles per request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// One request handed to the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentContext {
    pub member: MemberProfile,
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,

    /// Cycles already spent on this request
    #[serde(default)]
    pub retry_count: u32,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl AgentContext {
    pub fn new(member: MemberProfile, message: impl Into<String>) -> Self {
        Self {
            member,
            message: message.into(),
            conversation_history: Vec::new(),
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Everything the agent loop hands back for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// Whether the goal was achieved
    pub success: bool,
    pub response: String,
    pub intent: Intent,
    pub execution_result: ExecutionResult,
    pub goal_validation: GoalValidation,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub requires_follow_up: bool,
    /// Retry count of the cycle that produced this result
    pub retry_count: u32,
    /// PLAN passes performed for this call
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}
