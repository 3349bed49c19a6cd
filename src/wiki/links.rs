//! Link extraction and title normalization.
//!
//! The normalized title is the only stable identity for an article: BFS
//! membership, link-set cache lookups, and goal matching all compare
//! normalized keys, never raw titles or URLs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::WIKIPEDIA_BASE_URL;

/// Markdown link construct: `[text](href)`.
pub static LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));

/// Namespaces that never count as article links.
const SPECIAL_PREFIXES: &[&str] = &[
    "Special:",
    "Wikipedia:",
    "Help:",
    "Category:",
    "Portal:",
    "Template:",
    "Template_talk:",
    "Talk:",
    "User:",
    "User_talk:",
    "File:",
    "MediaWiki:",
    "Module:",
    "Draft:",
];

/// Normalize a title into the canonical comparison key.
///
/// Case, underscores, and surrounding whitespace are not identity.
pub fn normalize_title(title: &str) -> String {
    title.to_lowercase().replace('_', " ").trim().to_string()
}

/// Whether two titles refer to the same article.
pub fn titles_match(a: &str, b: &str) -> bool {
    normalize_title(a) == normalize_title(b)
}

/// Canonical page URL for a title.
pub fn article_url(title: &str) -> String {
    format!("{WIKIPEDIA_BASE_URL}{}", title.replace(' ', "_"))
}

/// Strip a trailing quoted title attribute from an href.
///
/// Wikipedia markup and some model responses attach one:
/// `/wiki/Animal "Animal"` becomes `/wiki/Animal`.
pub fn strip_title_attribute(href: &str) -> &str {
    let href = if let Some(idx) = href.find(" \"") {
        &href[..idx]
    } else if let Some(idx) = href.find(" '") {
        &href[..idx]
    } else {
        href
    };
    href.trim()
}

/// Resolve an href to an article title, or `None` if it is not a
/// same-site article link (external URL, meta namespace, fragment-only).
pub fn normalize_wiki_url(href: &str) -> Option<String> {
    let title = if let Some(rest) = href.strip_prefix("/wiki/") {
        rest
    } else if let Some(rest) = href.strip_prefix("//en.wikipedia.org/wiki/") {
        rest
    } else if let Some(rest) = href.strip_prefix("https://en.wikipedia.org/wiki/") {
        rest
    } else if let Some(rest) = href.strip_prefix("http://en.wikipedia.org/wiki/") {
        rest
    } else {
        return None;
    };

    // Drop the fragment
    let title = title.split('#').next().unwrap_or("");
    if title.is_empty() {
        return None;
    }

    if SPECIAL_PREFIXES.iter().any(|p| title.starts_with(p)) {
        return None;
    }

    // External link indicators that survived the prefix strip
    if title.starts_with("//") || title.starts_with("http") {
        return None;
    }

    let decoded = urlencoding::decode(title)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| title.to_string());

    Some(decoded.replace('_', " "))
}

/// Extract the on-page link index: every `(display text, href)` pair
/// whose target resolves to an article.
pub fn extract_links(text: &str) -> Vec<(String, String)> {
    let mut links = Vec::new();

    for cap in LINK_PATTERN.captures_iter(text) {
        let display = cap[1].trim();
        let href = cap[2].trim();
        if display.is_empty() || href.is_empty() {
            continue;
        }

        let href = strip_title_attribute(href);
        if normalize_wiki_url(href).is_some() {
            links.push((display.to_string(), href.to_string()));
        }
    }

    links
}

/// Best-effort title for any URL shape. Falls back to the raw input when
/// no `/wiki/` path component exists.
pub fn title_from_url(url: &str) -> String {
    if let Some(title) = normalize_wiki_url(url) {
        return title;
    }

    if let Some(idx) = url.rfind("/wiki/") {
        let tail = &url[idx + 6..];
        let tail = tail.split('#').next().unwrap_or("");
        let decoded = urlencoding::decode(tail)
            .map(|c| c.into_owned())
            .unwrap_or_else(|_| tail.to_string());
        return decoded.replace('_', " ");
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_case_underscores_whitespace() {
        assert_eq!(normalize_title("Albert_Einstein"), "albert einstein");
        assert_eq!(normalize_title("  Albert Einstein "), "albert einstein");
        assert_eq!(normalize_title("ALBERT EINSTEIN"), normalize_title("albert_einstein"));
    }

    #[test]
    fn titles_match_ignores_formatting() {
        assert!(titles_match("Deep_learning", "deep learning"));
        assert!(!titles_match("Deep learning", "Machine learning"));
    }

    #[test]
    fn strips_title_attributes() {
        assert_eq!(strip_title_attribute("/wiki/Animal \"Animal\""), "/wiki/Animal");
        assert_eq!(strip_title_attribute("/wiki/Animal 'Animal'"), "/wiki/Animal");
        assert_eq!(strip_title_attribute("/wiki/Animal"), "/wiki/Animal");
    }

    #[test]
    fn recognizes_relative_and_absolute_article_links() {
        assert_eq!(normalize_wiki_url("/wiki/Animal"), Some("Animal".into()));
        assert_eq!(
            normalize_wiki_url("https://en.wikipedia.org/wiki/Animal"),
            Some("Animal".into())
        );
        assert_eq!(
            normalize_wiki_url("/wiki/Ludwig_van_Beethoven"),
            Some("Ludwig van Beethoven".into())
        );
    }

    #[test]
    fn rejects_namespaces_externals_and_fragments() {
        assert_eq!(normalize_wiki_url("/wiki/Special:Random"), None);
        assert_eq!(normalize_wiki_url("/wiki/Category:Mammals"), None);
        assert_eq!(normalize_wiki_url("/wiki/File:Cat.jpg"), None);
        assert_eq!(normalize_wiki_url("https://example.com/page"), None);
        assert_eq!(normalize_wiki_url("/wiki/#section"), None);
    }

    #[test]
    fn fragment_is_dropped_from_title() {
        assert_eq!(
            normalize_wiki_url("/wiki/Animal#Taxonomy"),
            Some("Animal".into())
        );
    }

    #[test]
    fn percent_encoded_titles_decode() {
        assert_eq!(
            normalize_wiki_url("/wiki/M%C3%BCnchen"),
            Some("München".into())
        );
    }

    #[test]
    fn extract_links_keeps_only_article_targets() {
        let text = "See [Animal](/wiki/Animal) and [cats](/wiki/Cat \"Cat\") \
                    but not [edit](https://example.com) or [files](/wiki/File:X.jpg).";
        let links = extract_links(text);
        assert_eq!(
            links,
            vec![
                ("Animal".to_string(), "/wiki/Animal".to_string()),
                ("cats".to_string(), "/wiki/Cat".to_string()),
            ]
        );
    }

    #[test]
    fn title_from_url_falls_back_to_path_tail() {
        assert_eq!(title_from_url("/wiki/Animal"), "Animal");
        assert_eq!(
            title_from_url("https://en.wikipedia.org/wiki/Deep_learning#History"),
            "Deep learning"
        );
        assert_eq!(title_from_url("not-a-wiki-url"), "not-a-wiki-url");
    }

    #[test]
    fn article_url_round_trips_spaces() {
        assert_eq!(
            article_url("Albert Einstein"),
            "https://en.wikipedia.org/wiki/Albert_Einstein"
        );
    }
}
