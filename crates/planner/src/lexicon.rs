//! Keyword tables.
//!
//! Single words match on word boundaries, phrases (anything with a space
//! or hyphen) match as substrings of the lowercased message.

use concierge_core::ServiceCategory;

pub struct CategoryLexicon {
    pub keywords: &'static [&'static str],
    /// Subset of `keywords` worth triple weight
    pub high_value: &'static [&'static str],
}

const TRANSPORTATION: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "jet", "private jet", "flight", "flights", "fly", "flying", "charter", "aviation", "plane",
        "aircraft", "helicopter", "yacht", "boat", "car service", "chauffeur", "driver", "limo",
        "limousine", "transport", "transportation", "airport", "pickup", "pick-up", "ride",
        "transfer", "passenger", "passengers", "departure", "layover", "round trip",
    ],
    high_value: &["private jet", "charter", "aviation", "helicopter", "yacht", "chauffeur"],
};

const EVENTS: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "event", "events", "party", "gala", "dinner", "reservation", "reservations",
        "restaurant", "table", "tickets", "concert", "show", "venue", "celebration", "wedding",
        "birthday", "vip", "premiere", "festival", "fashion week", "book a table", "courtside",
        "backstage", "guest list",
    ],
    high_value: &["gala", "vip", "premiere", "reservation", "venue", "guest list"],
};

const BRAND_DEVELOPMENT: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "brand", "branding", "marketing", "pr", "public relations", "media", "press",
        "social media", "content", "campaign", "reputation", "influencer", "launch",
        "exposure", "publicity", "photoshoot", "press release", "podcast", "interview",
    ],
    high_value: &["brand", "public relations", "social media", "campaign", "press release"],
};

const INVESTMENTS: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "invest", "investing", "investment", "investments", "portfolio", "wealth", "fund",
        "funding", "capital", "stock", "stocks", "real estate", "property", "venture",
        "financial", "finance", "advisor", "returns", "equity", "startup", "private equity",
        "deal flow",
    ],
    high_value: &["investment", "portfolio", "real estate", "venture", "private equity"],
};

const COMMUNITY: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "community", "network", "networking", "connect", "introduction", "introductions",
        "introduce", "members", "meetup", "mentor", "mentorship", "collaborate",
        "collaboration", "club", "peers", "member mixer", "roundtable",
    ],
    high_value: &["networking", "introduction", "introductions", "mentorship", "member mixer"],
};

const LIFESTYLE: CategoryLexicon = CategoryLexicon {
    keywords: &[
        "lifestyle", "wellness", "spa", "fitness", "shopping", "personal shopper", "fashion",
        "health", "chef", "private chef", "villa", "vacation", "holiday", "retreat", "concierge",
        "recommendation", "style", "stylist", "hotel", "suite", "gift",
    ],
    high_value: &["personal shopper", "private chef", "wellness", "villa", "retreat"],
};

pub fn category_lexicon(category: ServiceCategory) -> &'static CategoryLexicon {
    match category {
        ServiceCategory::Transportation => &TRANSPORTATION,
        ServiceCategory::Events => &EVENTS,
        ServiceCategory::BrandDevelopment => &BRAND_DEVELOPMENT,
        ServiceCategory::Investments => &INVESTMENTS,
        ServiceCategory::Community => &COMMUNITY,
        ServiceCategory::Lifestyle => &LIFESTYLE,
    }
}

// ── Greetings ──

pub const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "hiya", "howdy", "greetings", "good morning", "good afternoon",
    "good evening", "how are you", "what's up", "thanks", "thank you",
];

/// Words that turn a greeting into an actual request.
pub const REQUEST_MARKERS: &[&str] = &[
    "need", "want", "book", "arrange", "find", "get", "reserve", "schedule", "organize",
    "plan", "looking for", "help with", "can you", "could you", "would like",
];

// ── Urgency ──

pub const EMERGENCY_TERMS: &[&str] = &[
    "emergency", "crisis", "critical", "immediately", "life or death", "stranded",
    "medical", "evacuate", "evacuation", "right now",
];

pub const URGENT_TERMS: &[&str] = &[
    "urgent", "urgently", "asap", "as soon as possible", "quickly", "in a rush", "rushed",
    "tomorrow", "soon", "last minute", "last-minute", "time-sensitive", "in a hurry",
];

pub const STANDARD_TERMS: &[&str] = &[
    "whenever", "no rush", "flexible", "eventually", "next month", "next year", "no hurry",
];

/// Same-day words that force at least urgent handling.
pub const SAME_DAY_TERMS: &[&str] = &["today", "tonight", "this evening", "this afternoon"];

// ── Tiers ──

pub const PREMIUM_TERMS: &[&str] = &[
    "premium", "luxury", "luxurious", "exclusive", "first class", "first-class", "top tier",
    "top-tier", "finest", "ultra", "bespoke",
];

pub const ENHANCED_TERMS: &[&str] = &["enhanced", "upgraded", "upgrade", "comfortable", "business class"];

pub const BASIC_TERMS: &[&str] = &["basic", "budget", "cheap", "affordable", "economy", "simple"];

// ── Conversation context ──

pub const AVIATION_TERMS: &[&str] = &[
    "jet", "private jet", "flight", "fly", "charter", "aviation", "plane", "aircraft", "airport",
    "tail number", "runway",
];

pub const DINING_TERMS: &[&str] = &[
    "dinner", "dining", "restaurant", "reservation", "table", "chef", "lunch", "brunch",
    "tasting menu", "sommelier",
];

/// Openers that mark a message as continuing the previous exchange.
pub const FOLLOW_UP_MARKERS: &[&str] = &[
    "yes", "yeah", "yep", "no", "nope", "also", "and", "what about", "how about", "that",
    "it", "ok", "okay", "sure", "same", "instead", "actually", "make it", "change", "please",
    "perfect", "great",
];

// ── Service-type refinement ──

type ServiceTypeGroup = (&'static str, &'static [&'static str]);

const TRANSPORTATION_TYPES: &[ServiceTypeGroup] = &[
    ("private_aviation", &["private jet", "jet", "charter", "aircraft", "plane", "flight", "fly", "aviation"]),
    ("helicopter", &["helicopter", "heli"]),
    ("yacht_charter", &["yacht", "boat", "sailing"]),
    ("ground_transportation", &["car service", "chauffeur", "driver", "limo", "limousine", "pickup", "transfer"]),
];

const EVENT_TYPES: &[ServiceTypeGroup] = &[
    ("dining_reservation", &["dinner", "restaurant", "reservation", "table", "book a table", "lunch"]),
    ("private_event", &["party", "celebration", "wedding", "birthday", "gala"]),
    ("vip_access", &["vip", "premiere", "backstage", "courtside", "guest list", "fashion week"]),
    ("entertainment_tickets", &["tickets", "concert", "show", "festival"]),
];

const BRAND_TYPES: &[ServiceTypeGroup] = &[
    ("public_relations", &["pr", "public relations", "press", "press release", "publicity", "interview"]),
    ("social_media", &["social media", "influencer", "content", "podcast"]),
    ("brand_strategy", &["brand", "branding", "reputation", "launch", "campaign", "marketing"]),
];

const INVESTMENT_TYPES: &[ServiceTypeGroup] = &[
    ("real_estate", &["real estate", "property"]),
    ("venture_capital", &["venture", "startup", "deal flow", "funding"]),
    ("wealth_management", &["portfolio", "wealth", "advisor", "stocks", "stock", "fund"]),
];

const COMMUNITY_TYPES: &[ServiceTypeGroup] = &[
    ("introductions", &["introduction", "introductions", "introduce", "connect"]),
    ("mentorship", &["mentor", "mentorship"]),
    ("member_events", &["meetup", "member mixer", "roundtable", "club"]),
];

const LIFESTYLE_TYPES: &[ServiceTypeGroup] = &[
    ("wellness", &["wellness", "spa", "fitness", "health", "retreat"]),
    ("personal_shopping", &["personal shopper", "shopping", "fashion", "stylist", "style", "gift"]),
    ("private_dining", &["private chef", "chef"]),
    ("travel_stays", &["villa", "vacation", "holiday", "hotel", "suite"]),
];

pub fn service_types(category: ServiceCategory) -> &'static [ServiceTypeGroup] {
    match category {
        ServiceCategory::Transportation => TRANSPORTATION_TYPES,
        ServiceCategory::Events => EVENT_TYPES,
        ServiceCategory::BrandDevelopment => BRAND_TYPES,
        ServiceCategory::Investments => INVESTMENT_TYPES,
        ServiceCategory::Community => COMMUNITY_TYPES,
        ServiceCategory::Lifestyle => LIFESTYLE_TYPES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_value_terms_are_keywords() {
        for category in ServiceCategory::ALL {
            let lex = category_lexicon(category);
            for term in lex.high_value {
                assert!(
                    lex.keywords.contains(term),
                    "{category}: high-value '{term}' missing from keywords"
                );
            }
        }
    }

    #[test]
    fn every_category_has_service_types() {
        for category in ServiceCategory::ALL {
            assert!(!service_types(category).is_empty());
        }
    }

    #[test]
    fn terms_are_lowercase() {
        for category in ServiceCategory::ALL {
            for term in category_lexicon(category).keywords {
                assert_eq!(*term, term.to_lowercase());
            }
        }
    }
}
