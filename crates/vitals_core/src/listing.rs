use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// One entry of a maintained listing page: an article plus the quality
/// assessment the page claims for it. `history` carries the payload of a
/// trailing icon (FFA, DGA and friends) when the line has more than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub title: String,
    pub assessment: String,
    pub history: Option<String>,
}

// Matches listing lines shaped like:
//   # {{Icon|FA}} {{Icon|FGA}} [[Article title]]
//   * {{icon|Start}} ''[[Article title|Displayed title]]''
// The first icon payload is the claimed assessment; the last of any further
// consecutive icons is the promotion/demotion history.
static LISTING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*[*#]+\s*\{\{[Ii]con\|(?P<assessment>\w+)\}\}(?:\s*\{\{[Ii]con\|(?P<history>\w+)\}\})*\s*'*\[\[(?P<target>[^#<>\[\]{}]+)\]\]",
    )
    .expect("listing pattern is valid")
});

/// Extracts every assessment listing from a page's wikitext, in document
/// order. This is a best-effort scan: lines that do not look like listings
/// are skipped, never an error, and duplicate titles are kept as-is.
pub fn parse_listings(content: &str) -> Vec<Listing> {
    LISTING_PATTERN
        .captures_iter(content)
        .map(|captures| {
            let target = captures.name("target").map(|found| found.as_str()).unwrap_or("");
            // Link target is everything before a display alias separator.
            let mut parts = target.splitn(2, '|');
            let title = parts.next().unwrap_or("").to_string();
            Listing {
                title,
                assessment: captures["assessment"].to_string(),
                history: captures
                    .name("history")
                    .map(|found| found.as_str().to_string()),
            }
        })
        .collect()
}
