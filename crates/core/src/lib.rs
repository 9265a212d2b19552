//! # Concierge Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! Concierge request-fulfilment agent. This crate has **no runtime
//! dependencies on any concrete collaborator**. It defines the model that
//! the planner, executor, goal checker and agent loop all work against.
//!
//! ## Data flow
//!
//! message → [`Intent`] → [`ExecutionResult`] → [`GoalValidation`] →
//! (retry with a tagged message | [`AgentResult`])

pub mod agent;
pub mod category;
pub mod error;
pub mod event;
pub mod execution;
pub mod goal;
pub mod intent;
pub mod interaction;
pub mod member;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentContext, AgentResult, DEFAULT_MAX_RETRIES};
pub use category::{ServiceCategory, ServiceTier, Urgency};
pub use error::{Error, LogError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use execution::{
    ExecutionPlan, ExecutionResult, ExecutionStep, ExecutionStrategy, StepResult, StepStatus,
};
pub use goal::{
    CriterionKind, CriterionResult, GoalValidation, RetryApproach, RetryStrategy, SuccessCriterion,
};
pub use intent::{ExtractedEntities, Intent};
pub use interaction::{InteractionLog, InteractionOutcome, InteractionRecord, LogReceipt, RunLog};
pub use member::{ConversationTurn, MemberProfile, MemberTier, Role};
pub use tool::{
    CatalogSearchResult, Notification, NotificationChannel, NotificationReceipt,
    NotificationUrgency, SearchHit, SearchProvider, ServiceCatalog, ServiceOffering, TicketParams,
    TicketPriority, TicketReceipt, TicketStore, ToolKind, ToolOutput, ToolParams, ToolSet,
};
