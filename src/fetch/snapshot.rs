//! Recognizes mirror answers that are not an archived copy of the page.
//!
//! A mirror without a snapshot still answers 200, with its own search form or
//! landing page. Serving that as the article would hide the miss from the
//! caller, so these pages are turned into fetch errors.

use crate::dom;

/// Shortest body text accepted as an archived article, in bytes.
pub const MIN_SNAPSHOT_TEXT_LEN: usize = 1000;

/// Landing pages that mention the mirror by name stay under this length.
const MIRROR_LANDING_TEXT_LEN: usize = 2000;

const PLACEHOLDER_PHRASES: &[&str] = &[
    "No results found",
    "Enter a URL to search",
    "This page shows only",
];

/// Why a mirror response is not a snapshot, or `None` if it looks like one.
#[must_use]
pub fn placeholder_reason(html: &str) -> Option<&'static str> {
    if html.contains(r#"id="search_form""#) {
        return Some("search form");
    }

    let text = dom::parse(html).select("body").text().to_string();
    let text = text.trim();

    if let Some(phrase) = PLACEHOLDER_PHRASES.iter().find(|p| text.contains(**p)) {
        return Some(*phrase);
    }
    if text.contains("archive.today") && text.len() < MIRROR_LANDING_TEXT_LEN {
        return Some("mirror landing page");
    }
    if text.len() < MIN_SNAPSHOT_TEXT_LEN {
        return Some("too little text");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> String {
        let body = "<p>Reporting from the scene, in some detail.</p>".repeat(40);
        format!("<html><body><article>{body}</article></body></html>")
    }

    #[test]
    fn test_article_is_accepted() {
        assert_eq!(placeholder_reason(&article()), None);
    }

    #[test]
    fn test_search_form_is_rejected() {
        let html = article().replace("<article>", r#"<form id="search_form"></form><article>"#);
        assert_eq!(placeholder_reason(&html), Some("search form"));
    }

    #[test]
    fn test_no_results_is_rejected() {
        let html = article().replace("<article>", "<h2>No results found</h2><article>");
        assert_eq!(placeholder_reason(&html), Some("No results found"));
    }

    #[test]
    fn test_short_landing_page_is_rejected() {
        let html = "<html><body><h1>archive.today</h1><p>webpage capture</p></body></html>";
        assert_eq!(placeholder_reason(html), Some("mirror landing page"));
    }

    #[test]
    fn test_short_page_is_rejected() {
        assert_eq!(
            placeholder_reason("<html><body><p>Loading...</p></body></html>"),
            Some("too little text")
        );
    }

    #[test]
    fn test_script_text_does_not_count() {
        let padding = "x".repeat(2 * MIN_SNAPSHOT_TEXT_LEN);
        let html = format!("<html><head><script>var s = '{padding}';</script></head><body><p>hi</p></body></html>");
        assert_eq!(placeholder_reason(&html), Some("too little text"));
    }
}
