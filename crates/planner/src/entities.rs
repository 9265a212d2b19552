//! Entity extraction: dates, locations, headcounts and preferences.
//!
//! Each pass is an independent pattern match; results are deduplicated in
//! first-seen order. Pure, no side effects.

use concierge_core::ExtractedEntities;
use regex_lite::Regex;
use std::sync::LazyLock;

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(today|tonight|tomorrow|this weekend|next weekend|this week|next week|next month|(?:this |next )?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
    )
    .expect("relative date pattern")
});

static ABSOLUTE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?|\d{1,2}/\d{1,2}(?:/\d{2,4})?|\d{4}-\d{2}-\d{2})\b",
    )
    .expect("absolute date pattern")
});

// Runs on the original casing: a location is a capitalised phrase after a preposition.
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Ii]n|[Tt]o|[Ff]rom|[Aa]t)\s+([A-Z][A-Za-z'.-]+(?:\s+[A-Z][A-Za-z'.-]+)*)")
        .expect("location pattern")
});

static HEADCOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d+\s+(?:passengers?|guests?|people|persons?|adults?|children|kids|travell?ers?|attendees?|pax)\b",
    )
    .expect("headcount pattern")
});

static PREFERENCE_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:prefer|prefers|want|wants|need|needs|would like|would love|looking for)\b")
        .expect("preference pattern")
});

const MAX_PREFERENCE_WORDS: usize = 4;

/// Words that end a preference phrase.
const PREFERENCE_STOP_WORDS: &[&str] = &[
    "from", "for", "in", "at", "on", "by", "with", "tomorrow", "today", "tonight", "next",
    "this", "and", "but", "please", "asap",
];

const LEADING_FILLERS: &[&str] = &["to", "a", "an", "the", "some", "my", "our"];

/// Pronouns that the location pattern would otherwise pick up.
const NOT_LOCATIONS: &[&str] = &["I", "Me", "My", "We", "Us", "You"];

/// Extract every entity kind from `text`.
pub fn extract(text: &str) -> ExtractedEntities {
    extract_all([text])
}

/// Extract from several texts in turn, merging results in first-seen order.
/// Texts are matched separately so a phrase never spans two turns.
pub fn extract_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> ExtractedEntities {
    let mut merged = ExtractedEntities::default();
    for text in texts {
        let lower = text.to_lowercase();
        merge(&mut merged.dates, extract_dates(&lower));
        merge(&mut merged.locations, extract_locations(text));
        merge(&mut merged.people, extract_headcounts(&lower));
        merge(&mut merged.preferences, extract_preferences(&lower));
    }
    merged
}

fn merge(into: &mut Vec<String>, found: Vec<String>) {
    for value in found {
        push_unique(into, value);
    }
}

fn push_unique(out: &mut Vec<String>, value: String) {
    if !value.is_empty() && !out.contains(&value) {
        out.push(value);
    }
}

fn extract_dates(lower: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in [&*RELATIVE_DATE, &*ABSOLUTE_DATE] {
        for m in re.find_iter(lower) {
            push_unique(&mut out, m.as_str().trim().to_string());
        }
    }
    out
}

fn extract_locations(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for caps in LOCATION.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        let place = m.as_str().trim_end_matches(['.', '\'', '-']);
        if NOT_LOCATIONS.contains(&place) {
            continue;
        }
        push_unique(&mut out, place.to_string());
    }
    out
}

fn extract_headcounts(lower: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in HEADCOUNT.find_iter(lower) {
        push_unique(&mut out, m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));
    }
    out
}

fn extract_preferences(lower: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in PREFERENCE_TRIGGER.find_iter(lower) {
        let mut words: Vec<&str> = Vec::new();
        for raw in lower[m.end()..].split_whitespace() {
            let word = raw.trim_end_matches(|c: char| !c.is_alphanumeric());
            let clause_ends = word.len() != raw.len();
            if word.is_empty() || PREFERENCE_STOP_WORDS.contains(&word) {
                break;
            }
            if PREFERENCE_TRIGGER.is_match(word) && !words.is_empty() {
                break;
            }
            if !(words.is_empty() && LEADING_FILLERS.contains(&word)) {
                words.push(word);
            }
            if clause_ends || words.len() >= MAX_PREFERENCE_WORDS {
                break;
            }
        }
        push_unique(&mut out, words.join(" "));
    }
    out
}
