//! # hidewall
//!
//! Fetches a web page on a caller's behalf, working around soft paywalls, and
//! returns a cleaned copy of the document.
//!
//! For sites known to gate content, the page is retrieved through a public
//! cache mirror (or, if configured, directly as a search crawler). The body is
//! then stripped of scripts, asides and mirror chrome, its image and gallery
//! URLs are made absolute, and the tree is rendered back to HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use hidewall::{clean, Origin};
//!
//! let html = br#"<html><body><article><p>Story</p>
//! <script>showPaywall()</script><aside>Subscribe!</aside>
//! <img src="/photo.jpg"></article></body></html>"#;
//!
//! let cleaned = clean(html, "https://news.example.com/world/story", Origin::Direct);
//! assert!(cleaned.contains(r#"<img src="https://news.example.com/photo.jpg">"#));
//! assert!(!cleaned.contains("showPaywall"));
//! ```
//!
//! Serving requests:
//!
//! ```rust,no_run
//! use hidewall::{Bypass, Options};
//!
//! # async fn serve() -> hidewall::Result<()> {
//! let bypass = Bypass::from_options(Options::load("hidewall.toml")?)?;
//! let response = bypass.handle(Some("https://www.nytimes.com/2024/01/01/story.html"), None).await;
//! assert_eq!(response.content_type, "text/html; charset=utf-8");
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **URL Validator**: syntactic check of the caller's URL ([`url_utils`])
//! - **Blocklist Matcher**: substring match against known paywalled sites ([`blocklist`])
//! - **Route Selector**: direct fetch or cache mirror, and which identity ([`route`])
//! - **Content Fetcher**: bounded GET plus decompression ([`fetch`])
//! - **HTML Rewriter**: fixed sequence of cleanup rules ([`rewrite`])
//! - **Renderer**: indented or compact HTML output ([`render`])

mod error;

/// Deployment configuration and identity constants.
pub mod options;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// URL validation, target derivation and resolution.
pub mod url_utils;

/// Blocked-site list and matcher.
pub mod blocklist;

/// Retrieval strategy and identity selection.
pub mod route;

/// Outbound HTTP fetch and body decompression.
pub mod fetch;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Cleanup and URL rewrite rules over the parsed document.
pub mod rewrite;

/// Document serialization.
pub mod render;

/// End-to-end pipeline and caller-facing responses.
pub mod pipeline;

/// Tracing subscriber bootstrap.
pub mod logging;

// Public API - re-exports
pub use blocklist::{is_blocked, BlockedSiteSet};
pub use error::{Error, FetchErrorKind, Result};
pub use fetch::{FetchResult, Fetcher};
pub use options::{BlockedPolicy, Options, ProxyMode};
pub use pipeline::{Bypass, BypassResponse, Outcome};
pub use render::{render, render_compact};
pub use rewrite::{rewrite, Document, Origin, RewriteStats};
pub use route::{plan, RetrievalPlan, Strategy};
pub use url_utils::{validate, TargetRequest};

/// Rewrites and renders an already-fetched body with default settings.
///
/// Equivalent to [`rewrite`] followed by [`render`]. Never fails.
#[must_use]
pub fn clean(body: &[u8], base_url: &str, origin: Origin) -> String {
    render(&rewrite(body, base_url, origin))
}
