//! Keyword scoring of categories.

use crate::lexicon::category_lexicon;
use concierge_core::ServiceCategory;
use std::collections::BTreeMap;

const HIGH_VALUE_MULTIPLIER: f64 = 3.0;
const PHRASE_MULTIPLIER: f64 = 2.0;

/// Lowercased text plus its word tokens.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    lower: String,
    words: Vec<String>,
}

impl NormalizedText {
    pub fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { lower, words }
    }

    pub fn as_str(&self) -> &str {
        &self.lower
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Word-boundary match for single words, substring match otherwise.
    pub fn contains_term(&self, term: &str) -> bool {
        if needs_substring_match(term) {
            self.lower.contains(term)
        } else {
            self.words.iter().any(|w| w == term)
        }
    }

    pub fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.contains_term(t))
    }

    /// Whether the first words of the text spell out `term`.
    pub fn starts_with_term(&self, term: &str) -> bool {
        let term_words: Vec<&str> = term.split_whitespace().collect();
        term_words.len() <= self.words.len()
            && term_words.iter().zip(&self.words).all(|(t, w)| *t == w.as_str())
    }
}

fn needs_substring_match(term: &str) -> bool {
    term.contains([' ', '-', '\''])
}

/// Weight of a single keyword hit.
fn keyword_weight(term: &str, high_value: bool) -> f64 {
    let mut weight = 1.0;
    if high_value {
        weight *= HIGH_VALUE_MULTIPLIER;
    }
    if needs_substring_match(term) {
        weight *= PHRASE_MULTIPLIER;
    }
    weight
}

/// Score per category. Iteration order is category priority order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores {
    scores: BTreeMap<ServiceCategory, f64>,
}

impl CategoryScores {
    /// Run the keyword table over `text`.
    pub fn compute(text: &NormalizedText) -> Self {
        let scores = ServiceCategory::ALL
            .into_iter()
            .map(|category| {
                let lex = category_lexicon(category);
                let score = lex
                    .keywords
                    .iter()
                    .filter(|kw| text.contains_term(kw))
                    .map(|kw| keyword_weight(kw, lex.high_value.contains(kw)))
                    .sum();
                (category, score)
            })
            .collect();
        Self { scores }
    }

    pub fn get(&self, category: ServiceCategory) -> f64 {
        self.scores.get(&category).copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.scores.values().copied().fold(0.0, f64::max)
    }

    /// Scores divided by the maximum; unchanged when every score is zero.
    pub fn normalized(&self) -> Self {
        let max = self.max();
        if max <= 0.0 {
            return self.clone();
        }
        Self {
            scores: self.scores.iter().map(|(c, s)| (*c, s / max)).collect(),
        }
    }

    /// Raise a category's score to at least `floor`.
    pub fn raise_to(&mut self, category: ServiceCategory, floor: f64) {
        let entry = self.scores.entry(category).or_insert(0.0);
        if *entry < floor {
            *entry = floor;
        }
    }

    /// Highest-scoring category under the keyword table, if any scored.
    pub fn best(&self) -> Option<ServiceCategory> {
        self.ranked()
            .first()
            .filter(|(_, score)| *score > 0.0)
            .map(|(c, _)| *c)
    }

    /// Categories by descending score; ties keep priority order.
    pub fn ranked(&self) -> Vec<(ServiceCategory, f64)> {
        let mut ranked: Vec<_> = self.scores.iter().map(|(c, s)| (*c, *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Number of categories scoring above `ratio` of the maximum.
    pub fn count_above_ratio(&self, ratio: f64) -> usize {
        let max = self.max();
        if max <= 0.0 {
            return 0;
        }
        self.scores.values().filter(|s| **s > max * ratio).count()
    }
}
