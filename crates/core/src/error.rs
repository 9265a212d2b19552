//! Error types for the Concierge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Concierge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Interaction log errors ---
    #[error("Interaction log error: {0}")]
    Log(#[from] LogError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failure of a single collaborator call.
///
/// Every variant carries a human-readable reason; the executor copies
/// `to_string()` into the failed step's result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Notification not delivered: {0}")]
    DeliveryFailed(String),

    #[error("Tool not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Clone, Error)]
pub enum LogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),
}
