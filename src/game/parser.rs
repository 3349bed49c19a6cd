//! Move extraction from free-form policy output.
//!
//! The contract asks the policy for exactly one `[text](href)` link.
//! Models pad their answers, so when more than one construct appears the
//! first one in document order whose target looks like a same-site
//! article link wins. That tie-break is policy, not accident.

use crate::wiki::links::{strip_title_attribute, LINK_PATTERN};

/// Extract the proposed move as `(display text, href)`.
///
/// Returns `None` when the response has no usable link; the caller owns
/// retry and abandonment.
pub fn parse_response(response: &str) -> Option<(String, String)> {
    let response = response.trim();
    let matches: Vec<(String, String)> = LINK_PATTERN
        .captures_iter(response)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect();

    if matches.len() == 1 {
        let (text, href) = &matches[0];
        return Some((text.clone(), strip_title_attribute(href).to_string()));
    }

    // Lenient fallback: first link that plausibly targets an article.
    for (text, href) in &matches {
        if href.contains("wikipedia.org") || href.starts_with("/wiki/") {
            return Some((text.clone(), strip_title_attribute(href).to_string()));
        }
    }

    None
}
