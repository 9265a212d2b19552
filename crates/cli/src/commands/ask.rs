//! `concierge ask`: single-request or interactive mode.

use std::sync::Arc;

use concierge_agent::AgentLoop;
use concierge_config::AppConfig;
use concierge_core::event::EventBus;
use concierge_core::{AgentResult, ConversationTurn, MemberTier};
use concierge_tools::{InMemoryInteractionLog, default_toolset};
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct MemberArgs {
    pub member_id: String,
    pub name: String,
    pub tier: MemberTier,
}

pub async fn run(
    config: &AppConfig,
    member: MemberArgs,
    message: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let agent = AgentLoop::new(
        config,
        default_toolset(&config.notifications),
        Arc::new(InMemoryInteractionLog::new()),
        Arc::new(EventBus::default()),
    );

    if let Some(msg) = message {
        // Single message mode
        let result = ask(&agent, &member, &msg, Vec::new()).await;
        println!("{}", render(&result, json)?);
        return Ok(());
    }

    // Interactive mode
    if !json {
        println!();
        println!("  Concierge: Interactive Mode");
        println!("  Member:  {} ({}, {})", member.name, member.member_id, member.tier);
        println!("  Type your request and press Enter. Type 'exit' to quit.");
        println!();
    }

    let mut history: Vec<ConversationTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let result = ask(&agent, &member, line, history.clone()).await;
        let rendered = render(&result, json)?;
        if json {
            println!("{rendered}");
        } else {
            for text in rendered.lines() {
                println!("  Concierge > {text}");
            }
            println!();
        }

        history.push(ConversationTurn::member(line));
        history.push(ConversationTurn::agent(result.response));
    }

    Ok(())
}

async fn ask(
    agent: &AgentLoop,
    member: &MemberArgs,
    message: &str,
    history: Vec<ConversationTurn>,
) -> AgentResult {
    agent
        .process_request(
            &member.member_id,
            &member.name,
            member.tier,
            message,
            history,
            None,
            None,
        )
        .await
}

/// The text printed for one result.
pub fn render(result: &AgentResult, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(result);
    }

    let mut out = result.response.clone();
    if let Some(incident) = &result.incident_id {
        out.push_str(&format!("\n[incident {incident}]"));
    } else if result.requires_follow_up {
        out.push_str("\n[a concierge will follow up]");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{ExecutionResult, GoalValidation, Intent};

    fn fallback(incident_id: Option<&str>, requires_follow_up: bool) -> AgentResult {
        AgentResult {
            success: false,
            response: "Sorry.".into(),
            intent: Intent::emergency_fallback(),
            execution_result: ExecutionResult::emergency_fallback(Vec::new()),
            goal_validation: GoalValidation::unmet("nothing"),
            recommendations: Vec::new(),
            next_steps: Vec::new(),
            requires_follow_up,
            retry_count: 0,
            attempts: 1,
            incident_id: incident_id.map(String::from),
        }
    }

    #[test]
    fn plain_rendering_marks_incidents() {
        let text = render(&fallback(Some("INC-1"), true), false).unwrap();
        assert_eq!(text, "Sorry.\n[incident INC-1]");
        let text = render(&fallback(None, true), false).unwrap();
        assert!(text.ends_with("[a concierge will follow up]"));
        let text = render(&fallback(None, false), false).unwrap();
        assert_eq!(text, "Sorry.");
    }

    #[test]
    fn json_rendering_is_parseable() {
        let text = render(&fallback(Some("INC-1"), true), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["incident_id"], "INC-1");
        assert_eq!(value["execution_result"]["escalation_needed"], true);
    }
}
