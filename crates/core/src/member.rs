//! Member and conversation value objects.
//!
//! A request always arrives on behalf of a member and carries the turns of
//! the conversation so far: Member sends a message → Planner reads it with
//! the history → Agent answers and the answer joins the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Membership level of the requesting member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberTier {
    #[default]
    Standard,
    /// Mid-tier membership
    Premium,
    /// Top-tier membership
    Founding,
}

impl MemberTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberTier::Standard => "standard",
            MemberTier::Premium => "premium",
            MemberTier::Founding => "founding",
        }
    }
}

impl fmt::Display for MemberTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "basic" => Ok(MemberTier::Standard),
            "premium" | "enhanced" => Ok(MemberTier::Premium),
            "founding" | "founder" | "elite" => Ok(MemberTier::Founding),
            other => Err(format!("unknown member tier: {other}")),
        }
    }
}

/// The member a request is fulfilled for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member_id: String,
    pub name: String,
    #[serde(default)]
    pub tier: MemberTier,
}

impl MemberProfile {
    pub fn new(member_id: impl Into<String>, name: impl Into<String>, tier: MemberTier) -> Self {
        Self {
            member_id: member_id.into(),
            name: name.into(),
            tier,
        }
    }

    /// First word of the member's name, for salutations.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

/// Who spoke a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Agent,
}

/// One turn of the conversation that preceded the current message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn member(content: impl Into<String>) -> Self {
        Self {
            role: Role::Member,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Concatenate the text of every turn, oldest first.
pub fn history_text(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
