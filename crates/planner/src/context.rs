//! Topic carry-over across a multi-turn conversation.

use crate::entities;
use crate::lexicon::{AVIATION_TERMS, DINING_TERMS, FOLLOW_UP_MARKERS};
use crate::scoring::{CategoryScores, NormalizedText};
use concierge_core::member::history_text;
use concierge_core::{ConversationTurn, ServiceCategory};

/// What the earlier turns were about.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub aviation: bool,
    pub dining: bool,
    /// Earlier turns named a place
    pub location: bool,
    /// Earlier turns named a date or time
    pub timing: bool,
    /// Best category when the whole history is scored as one text
    pub dominant: Option<ServiceCategory>,
    pub turns: usize,
}

impl ConversationContext {
    pub fn analyze(history: &[ConversationTurn]) -> Self {
        let joined = history_text(history);
        let text = NormalizedText::new(&joined);
        let found = entities::extract_all(history.iter().map(|t| t.content.as_str()));
        Self {
            aviation: text.contains_any(AVIATION_TERMS),
            dining: text.contains_any(DINING_TERMS),
            location: !found.locations.is_empty(),
            timing: !found.dates.is_empty(),
            dominant: CategoryScores::compute(&text).best(),
            turns: history.len(),
        }
    }

    /// `min(turns × per_turn, 1)`.
    pub fn strength(&self, per_turn: f64) -> f64 {
        (self.turns as f64 * per_turn).min(1.0)
    }

    pub fn has_signal(&self) -> bool {
        self.aviation || self.dining || self.location || self.timing
    }

    /// A follow-up is short, opens with a continuation marker, or carries no
    /// topic of its own, and only counts when the history has a topic.
    pub fn is_follow_up(&self, message: &NormalizedText, raw_max: f64, max_words: usize) -> bool {
        self.dominant.is_some()
            && (message.words().len() <= max_words
                || FOLLOW_UP_MARKERS.iter().any(|m| message.starts_with_term(m))
                || raw_max <= 0.0)
    }
}
