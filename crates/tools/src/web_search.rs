//! Web search provider that returns mock results.
//!
//! In production this would call a real search API. The mock returns
//! plausible, deterministic results so the research strategy can be
//! exercised end-to-end without network access.

use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::{SearchHit, SearchProvider};

pub struct MockSearchProvider {
    num_results: usize,
}

impl MockSearchProvider {
    pub fn new(num_results: usize) -> Self {
        Self {
            num_results: num_results.clamp(1, 5),
        }
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("empty search query".into()));
        }
        Ok(generate_mock_results(query, self.num_results))
    }
}

fn hit(title: &str, url: &str, snippet: &str) -> SearchHit {
    SearchHit {
        title: title.into(),
        url: url.into(),
        snippet: snippet.into(),
    }
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchHit> {
    let q = query.to_lowercase();

    // Topic-specific results for the common concierge verticals
    let templates: [(&[&str], Vec<SearchHit>); 3] = [
        (
            &["jet", "aviation", "charter", "flight"],
            vec![
                hit(
                    "Private aviation guide",
                    "https://example.com/aviation/guide",
                    "How light, midsize and heavy jets compare on range, cabin and cost.",
                ),
                hit(
                    "Charter operators directory",
                    "https://example.com/aviation/operators",
                    "Vetted charter operators with safety ratings and fleet details.",
                ),
            ],
        ),
        (
            &["dinner", "dining", "restaurant", "table"],
            vec![
                hit(
                    "Hardest tables to book this season",
                    "https://example.com/dining/hard-tables",
                    "The restaurants with the longest waitlists and how members get in.",
                ),
                hit(
                    "Private dining rooms",
                    "https://example.com/dining/private-rooms",
                    "Rooms for intimate dinners from six to forty guests.",
                ),
            ],
        ),
        (
            &["wellness", "retreat", "spa"],
            vec![hit(
                "Wellness retreats worth the trip",
                "https://example.com/wellness/retreats",
                "Residential programmes from three-day resets to month-long stays.",
            )],
        ),
    ];

    for (keywords, results) in templates {
        if keywords.iter().any(|k| q.contains(k)) {
            return results.into_iter().take(count).collect();
        }
    }

    (0..count)
        .map(|i| SearchHit {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", query.replace(' ', "+"), i + 1),
            snippet: format!("Mock search result for '{query}'."),
        })
        .collect()
}
