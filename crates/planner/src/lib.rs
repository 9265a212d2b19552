//! # Concierge Planner
//!
//! Turns a member message, the conversation so far and the member profile
//! into an [`Intent`]. Planning never fails: input that matches nothing maps
//! to the fallback category with low confidence.
//!
//! The pipeline is keyword scoring over fixed lexicons, normalised so the
//! top category scores 1.0, with an optional context pass that keeps a
//! multi-turn exchange anchored to its original topic.

mod context;
mod entities;
mod lexicon;
mod scoring;

pub use context::ConversationContext;
pub use entities::extract as extract_entities;

use concierge_config::PlannerConfig;
use concierge_core::member::history_text;
use concierge_core::{
    ConversationTurn, Intent, MemberProfile, MemberTier, RetryApproach, ServiceCategory,
    ServiceTier, Urgency,
};
use lexicon::{
    BASIC_TERMS, EMERGENCY_TERMS, ENHANCED_TERMS, GREETINGS, PREMIUM_TERMS, REQUEST_MARKERS,
    SAME_DAY_TERMS, STANDARD_TERMS, URGENT_TERMS, service_types,
};
use scoring::{CategoryScores, NormalizedText};
use tracing::debug;

const MAX_SECONDARY: usize = 2;

/// Keyword-driven intent planner.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a single message. Retry tags appended by the agent loop are
    /// ignored for classification.
    pub fn plan(
        &self,
        message: &str,
        history: &[ConversationTurn],
        profile: &MemberProfile,
    ) -> Intent {
        let cleaned = RetryApproach::strip_tags(message);
        let text = NormalizedText::new(&cleaned);
        let context = (!history.is_empty()).then(|| ConversationContext::analyze(history));

        let extracted_entities = entities::extract_all(
            history
                .iter()
                .map(|turn| turn.content.as_str())
                .chain([cleaned.as_str()]),
        );
        let urgency = detect_urgency(&text);
        let suggested_tier = suggest_tier(&text, profile);

        let topic_in_history = context.as_ref().is_some_and(|c| c.dominant.is_some());
        if !topic_in_history && self.is_greeting(&cleaned, &text) {
            debug!(member_id = %profile.member_id, "Greeting short-circuit");
            return Intent {
                primary_category: ServiceCategory::FALLBACK,
                secondary_categories: Vec::new(),
                service_type: Intent::GREETING.into(),
                urgency,
                confidence: self.config.greeting_confidence,
                extracted_entities,
                suggested_tier,
            };
        }

        let raw = CategoryScores::compute(&text);
        let raw_max = raw.max();
        let mut scores = raw.normalized();

        let follow_up = context.as_ref().filter(|c| {
            c.is_follow_up(&text, raw_max, self.config.follow_up_max_words)
        });
        if let Some(ctx) = follow_up {
            self.apply_context_boost(&mut scores, ctx);
        }

        let ranked = scores.ranked();
        let Some((primary, top)) = ranked.first().copied().filter(|(_, s)| *s > 0.0) else {
            debug!(member_id = %profile.member_id, "No category matched, using fallback");
            return Intent {
                primary_category: ServiceCategory::FALLBACK,
                secondary_categories: Vec::new(),
                service_type: refine_service_type(ServiceCategory::FALLBACK, &text),
                urgency,
                confidence: self.config.unmatched_confidence,
                extracted_entities,
                suggested_tier,
            };
        };

        let secondary_categories: Vec<ServiceCategory> = ranked
            .iter()
            .skip(1)
            .filter(|(_, score)| *score > self.config.relevance_floor)
            .take(MAX_SECONDARY)
            .map(|(category, _)| *category)
            .collect();

        let mut confidence = top.min(1.0);
        match follow_up {
            None => {
                if history.len() > 2 {
                    confidence += self.config.history_bonus;
                }
                confidence = self.ambiguity_discount(&scores, confidence);
            }
            Some(ctx) => {
                confidence = self.ambiguity_discount(&scores, confidence);
                if ctx.dominant == Some(primary) && ctx.has_signal() {
                    confidence = confidence.max(self.config.strong_context_confidence);
                }
                if top > 0.5 {
                    confidence = confidence.max(self.config.follow_up_confidence);
                }
            }
        }
        let confidence = confidence.clamp(0.0, 1.0);

        let mut service_type = refine_service_type(primary, &text);
        if follow_up.is_some() && service_type == Intent::GENERAL {
            let joined = NormalizedText::new(&history_text(history));
            service_type = refine_service_type(primary, &joined);
        }

        debug!(
            member_id = %profile.member_id,
            category = %primary,
            confidence,
            urgency = urgency.as_str(),
            follow_up = follow_up.is_some(),
            "Planned intent"
        );

        Intent {
            primary_category: primary,
            secondary_categories,
            service_type,
            urgency,
            confidence,
            extracted_entities,
            suggested_tier,
        }
    }

    /// Short, request-free message matching the greeting lexicon.
    fn is_greeting(&self, raw: &str, text: &NormalizedText) -> bool {
        raw.trim().chars().count() < self.config.greeting_max_len
            && text.contains_any(GREETINGS)
            && !text.contains_any(REQUEST_MARKERS)
    }

    fn apply_context_boost(&self, scores: &mut CategoryScores, ctx: &ConversationContext) {
        let strength = ctx.strength(self.config.context_strength_per_turn);
        if let Some(dominant) = ctx.dominant {
            let boosted = (scores.get(dominant) + strength).max(self.config.dominant_floor);
            scores.raise_to(dominant, boosted);
        }
        if ctx.aviation {
            scores.raise_to(ServiceCategory::Transportation, self.config.aviation_floor);
        }
        if ctx.dining {
            scores.raise_to(ServiceCategory::Events, self.config.dining_floor);
        }
    }

    fn ambiguity_discount(&self, scores: &CategoryScores, confidence: f64) -> f64 {
        if scores.count_above_ratio(self.config.ambiguity_ratio) > 2 {
            confidence * self.config.ambiguity_penalty
        } else {
            confidence
        }
    }
}

fn detect_urgency(text: &NormalizedText) -> Urgency {
    if text.contains_any(EMERGENCY_TERMS) {
        Urgency::Emergency
    } else if text.contains_any(URGENT_TERMS) || text.contains_any(SAME_DAY_TERMS) {
        Urgency::Urgent
    } else if text.contains_any(STANDARD_TERMS) {
        Urgency::Standard
    } else {
        Urgency::default()
    }
}

fn suggest_tier(text: &NormalizedText, profile: &MemberProfile) -> ServiceTier {
    if text.contains_any(PREMIUM_TERMS) {
        return ServiceTier::Premium;
    }
    if text.contains_any(ENHANCED_TERMS) {
        return ServiceTier::Enhanced;
    }
    if text.contains_any(BASIC_TERMS) {
        return ServiceTier::Basic;
    }
    match profile.tier {
        MemberTier::Founding => ServiceTier::Premium,
        MemberTier::Premium | MemberTier::Standard => ServiceTier::Enhanced,
    }
}

fn refine_service_type(category: ServiceCategory, text: &NormalizedText) -> String {
    service_types(category)
        .iter()
        .find(|(_, terms)| text.contains_any(terms))
        .map(|(name, _)| (*name).to_string())
        .unwrap_or_else(|| Intent::GENERAL.to_string())
}
