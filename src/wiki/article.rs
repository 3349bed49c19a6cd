//! Article content extraction.
//!
//! Converts rendered page HTML into link-preserving plain text: anchors
//! become `[text](href)` constructs the parser and link index understand,
//! everything else is stripped. Navigation artifacts ([edit] links,
//! reference markers, show/hide toggles) are removed deterministically so
//! the policy sees only prose and links.

use once_cell::sync::Lazy;
use regex::Regex;

use super::api::{WikiClient, WikiError};

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").expect("valid script regex")
});

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).expect("valid anchor regex")
});

static ANCHOR_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)title="([^"]*)""#).expect("valid title regex"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static EMPTY_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\]\([^)]*\)").expect("valid empty-link regex"));

static REF_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\]").expect("valid ref-marker regex"));

static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank-run regex"));

/// Fetch a page and reduce it to cleaned, link-preserving text.
///
/// Returns `(title, text)`. Empty text means the page rendered to
/// nothing usable; callers treat that as unreadable.
pub async fn fetch_article_text(
    api: &WikiClient,
    title: &str,
) -> Result<(String, String), WikiError> {
    let html = api.page_html(title).await?;
    Ok((title.to_string(), clean_html(&html)))
}

/// HTML to text, keeping anchors as `[text](href "title")` constructs.
pub fn clean_html(html: &str) -> String {
    let text = COMMENT.replace_all(html, "");
    let text = SCRIPT_STYLE.replace_all(&text, "");

    // Anchors first, so their display text survives the tag strip.
    let text = ANCHOR.replace_all(&text, |cap: &regex::Captures<'_>| {
        let href = cap[1].trim();
        let inner = TAG.replace_all(&cap[2], "");
        let display = unescape_entities(inner.trim());
        if display.is_empty() || href.is_empty() {
            return String::new();
        }
        // Wikipedia anchors carry a title attribute; keep it in the
        // construct the way the rendered markup does.
        match ANCHOR_TITLE.captures(&cap[0]) {
            Some(t) => format!("[{display}]({href} \"{}\")", t[1].trim()),
            None => format!("[{display}]({href})"),
        }
    });

    let text = TAG.replace_all(&text, "");
    let text = unescape_entities(&text);

    let text = EMPTY_LINK.replace_all(&text, "");
    let text = REF_MARKER.replace_all(&text, "");
    let text = text
        .replace("[edit]", "")
        .replace("[hide]", "")
        .replace("[show]", "");

    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    BLANK_RUNS.replace_all(&joined, "\n\n").trim().to_string()
}

fn unescape_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_become_link_constructs() {
        let html = r#"<p>The <a href="/wiki/Cat" title="Cat">domestic cat</a> is small.</p>"#;
        let text = clean_html(html);
        assert_eq!(text, r#"The [domestic cat](/wiki/Cat "Cat") is small."#);
    }

    #[test]
    fn anchors_without_title_have_no_attribute() {
        let html = r#"<a href="/wiki/Dog">dogs</a>"#;
        assert_eq!(clean_html(html), "[dogs](/wiki/Dog)");
    }

    #[test]
    fn scripts_styles_and_comments_are_removed() {
        let html = "<script>var x = 1;</script><style>.a{}</style><!-- nav -->text";
        assert_eq!(clean_html(html), "text");
    }

    #[test]
    fn navigation_artifacts_are_stripped() {
        let html = "<p>History[edit] of cats[1][2] [show]</p>";
        assert_eq!(clean_html(html), "History of cats");
    }

    #[test]
    fn nested_markup_inside_anchor_text_is_flattened() {
        let html = r#"<a href="/wiki/Cat"><b>bold</b> cat</a>"#;
        assert_eq!(clean_html(html), "[bold cat](/wiki/Cat)");
    }

    #[test]
    fn blank_line_runs_collapse() {
        let html = "<p>a</p>\n\n\n\n<p>b</p>";
        assert_eq!(clean_html(html), "a\n\nb");
    }

    #[test]
    fn entities_unescape() {
        let html = "<p>Tom &amp; Jerry&nbsp;&#39;toons&#39;</p>";
        assert_eq!(clean_html(html), "Tom & Jerry 'toons'");
    }
}
