//! Closed vocabularies shared by every stage: service categories,
//! urgency levels and service tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of service categories a request can be routed to.
///
/// Declaration order is the tie-break priority when two categories score
/// equally; `Lifestyle` is the lowest-priority catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Transportation,
    Events,
    BrandDevelopment,
    Investments,
    Community,
    Lifestyle,
}

impl ServiceCategory {
    /// Every category, in priority order.
    pub const ALL: [ServiceCategory; 6] = [
        ServiceCategory::Transportation,
        ServiceCategory::Events,
        ServiceCategory::BrandDevelopment,
        ServiceCategory::Investments,
        ServiceCategory::Community,
        ServiceCategory::Lifestyle,
    ];

    /// The category used when nothing else matches.
    pub const FALLBACK: ServiceCategory = ServiceCategory::Lifestyle;

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Transportation => "transportation",
            ServiceCategory::Events => "events",
            ServiceCategory::BrandDevelopment => "brand_development",
            ServiceCategory::Investments => "investments",
            ServiceCategory::Community => "community",
            ServiceCategory::Lifestyle => "lifestyle",
        }
    }

    /// Human-facing label used in responses.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceCategory::Transportation => "transportation",
            ServiceCategory::Events => "events",
            ServiceCategory::BrandDevelopment => "brand development",
            ServiceCategory::Investments => "investment",
            ServiceCategory::Community => "community",
            ServiceCategory::Lifestyle => "lifestyle",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly a request must be handled. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[default]
    Standard,
    Urgent,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Standard => "standard",
            Urgency::Urgent => "urgent",
            Urgency::Emergency => "emergency",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service level suggested for fulfilment. Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    Basic,
    #[default]
    Enhanced,
    Premium,
}

impl ServiceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTier::Basic => "basic",
            ServiceTier::Enhanced => "enhanced",
            ServiceTier::Premium => "premium",
        }
    }

    /// The next tier down, saturating at `Basic`.
    pub fn lower(&self) -> ServiceTier {
        match self {
            ServiceTier::Premium => ServiceTier::Enhanced,
            ServiceTier::Enhanced | ServiceTier::Basic => ServiceTier::Basic,
        }
    }
}

impl fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
