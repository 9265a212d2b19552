//! Configuration loading, validation, and management for Concierge.
//!
//! Loads configuration from `~/.concierge/config.toml` with environment
//! variable overrides. Every heuristic threshold used by the planner,
//! executor and goal checker lives here so it can be tuned without a
//! rebuild. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.concierge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Planner thresholds
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Strategy selection thresholds
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Goal achievement thresholds
    #[serde(default)]
    pub goals: GoalConfig,

    /// Outbound notification throttle
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Ceiling on retry cycles per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    2
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Secondary categories must score above this relative score
    pub relevance_floor: f64,
    /// Categories above this share of the max count as ambiguous
    pub ambiguity_ratio: f64,
    /// Confidence multiplier when more than two categories are ambiguous
    pub ambiguity_penalty: f64,
    /// Confidence bonus for a history longer than two turns
    pub history_bonus: f64,
    /// Messages shorter than this may be treated as greetings
    pub greeting_max_len: usize,
    pub greeting_confidence: f64,
    /// Confidence for input that matched no keyword at all
    pub unmatched_confidence: f64,
    /// Context strength gained per history turn (capped at 1.0)
    pub context_strength_per_turn: f64,
    pub dominant_floor: f64,
    pub aviation_floor: f64,
    pub dining_floor: f64,
    pub strong_context_confidence: f64,
    pub follow_up_confidence: f64,
    /// Messages with at most this many words count as follow-ups
    pub follow_up_max_words: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            relevance_floor: 0.3,
            ambiguity_ratio: 0.8,
            ambiguity_penalty: 0.8,
            history_bonus: 0.1,
            greeting_max_len: 50,
            greeting_confidence: 0.8,
            unmatched_confidence: 0.3,
            context_strength_per_turn: 0.2,
            dominant_floor: 0.8,
            aviation_floor: 0.8,
            dining_floor: 0.7,
            strong_context_confidence: 0.8,
            follow_up_confidence: 0.7,
            follow_up_max_words: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Confidence above which direct fulfilment is attempted
    pub direct_threshold: f64,
    /// Confidence above which guided collection is used
    pub guided_threshold: f64,
    /// Confidence below which the request goes straight to a human
    pub escalation_threshold: f64,
    /// Service id for tickets whose lookup produced nothing
    pub default_service_id: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            direct_threshold: 0.8,
            guided_threshold: 0.6,
            escalation_threshold: 0.2,
            default_service_id: "concierge-general".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    pub achieved_score: f64,
    pub partial_score: f64,
    /// Share of required criteria that counts as "mostly met"
    pub required_ratio: f64,
    /// Credit for a failed optional criterion, as a share of its weight
    pub optional_credit: f64,
    /// Criteria at or above this weight are required
    pub required_weight: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            achieved_score: 0.8,
            partial_score: 0.6,
            required_ratio: 0.75,
            optional_credit: 0.3,
            required_weight: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Non-critical notifications allowed per window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: usize,
}

fn default_window_secs() -> u64 {
    60
}
fn default_max_per_window() -> usize {
    5
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_per_window: default_max_per_window(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the default path (~/.concierge/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `CONCIERGE_MAX_RETRIES`
    /// - `CONCIERGE_LOG_FORMAT` (`pretty` or `json`)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in production).
    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("CONCIERGE_MAX_RETRIES") {
            self.agent.max_retries = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("CONCIERGE_MAX_RETRIES is not a number: {raw}"))
            })?;
        }

        if let Some(raw) = lookup("CONCIERGE_LOG_FORMAT") {
            self.logging.format = match raw.trim().to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "CONCIERGE_LOG_FORMAT must be 'pretty' or 'json', got '{other}'"
                    )));
                }
            };
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".concierge")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.planner;
        let e = &self.executor;
        let g = &self.goals;
        let unit_values = [
            ("planner.relevance_floor", p.relevance_floor),
            ("planner.ambiguity_ratio", p.ambiguity_ratio),
            ("planner.ambiguity_penalty", p.ambiguity_penalty),
            ("planner.history_bonus", p.history_bonus),
            ("planner.greeting_confidence", p.greeting_confidence),
            ("planner.unmatched_confidence", p.unmatched_confidence),
            ("planner.context_strength_per_turn", p.context_strength_per_turn),
            ("planner.dominant_floor", p.dominant_floor),
            ("planner.aviation_floor", p.aviation_floor),
            ("planner.dining_floor", p.dining_floor),
            ("planner.strong_context_confidence", p.strong_context_confidence),
            ("planner.follow_up_confidence", p.follow_up_confidence),
            ("executor.direct_threshold", e.direct_threshold),
            ("executor.guided_threshold", e.guided_threshold),
            ("executor.escalation_threshold", e.escalation_threshold),
            ("goals.achieved_score", g.achieved_score),
            ("goals.partial_score", g.partial_score),
            ("goals.required_ratio", g.required_ratio),
            ("goals.optional_credit", g.optional_credit),
            ("goals.required_weight", g.required_weight),
        ];

        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }

        if g.partial_score > g.achieved_score {
            return Err(ConfigError::ValidationError(
                "goals.partial_score must not exceed goals.achieved_score".into(),
            ));
        }

        if e.escalation_threshold > e.guided_threshold || e.guided_threshold > e.direct_threshold {
            return Err(ConfigError::ValidationError(
                "executor thresholds must satisfy escalation <= guided <= direct".into(),
            ));
        }

        if e.default_service_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "executor.default_service_id must not be empty".into(),
            ));
        }

        if self.notifications.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "notifications.window_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as a TOML document.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
