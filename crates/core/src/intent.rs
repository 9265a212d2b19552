//! The structured interpretation of a single member message.

use crate::category::{ServiceCategory, ServiceTier, Urgency};
use serde::{Deserialize, Serialize};

/// Entities pulled out of the message text. Each list is deduplicated and
/// keeps first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,

    /// Headcount phrases such as "4 passengers"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<String>,
}

impl ExtractedEntities {
    /// Numeric value of the first headcount phrase.
    pub fn headcount(&self) -> Option<u32> {
        self.people
            .iter()
            .find_map(|p| p.split_whitespace().next()?.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
            && self.locations.is_empty()
            && self.people.is_empty()
            && self.preferences.is_empty()
    }
}

/// Result of planning one message. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub primary_category: ServiceCategory,
    /// Up to two further categories above the relevance floor, best first
    pub secondary_categories: Vec<ServiceCategory>,
    pub service_type: String,
    pub urgency: Urgency,
    /// In `[0, 1]`
    pub confidence: f64,
    pub extracted_entities: ExtractedEntities,
    pub suggested_tier: ServiceTier,
}

impl Intent {
    /// Service type assigned to a short greeting.
    pub const GREETING: &'static str = "greeting";
    /// Service type when no refinement group matched.
    pub const GENERAL: &'static str = "general";

    pub fn is_greeting(&self) -> bool {
        self.service_type == Self::GREETING
    }

    /// The maximum-urgency intent used when a whole cycle failed.
    pub fn emergency_fallback() -> Self {
        Self {
            primary_category: ServiceCategory::FALLBACK,
            secondary_categories: Vec::new(),
            service_type: "system_error".into(),
            urgency: Urgency::Emergency,
            confidence: 0.0,
            extracted_entities: ExtractedEntities::default(),
            suggested_tier: ServiceTier::Premium,
        }
    }
}
