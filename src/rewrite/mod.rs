//! HTML Rewriter.
//!
//! Parses a fetched body and applies the cleanup rules in a fixed order:
//!
//! 1. strip `<script>` elements
//! 2. remove cache-provider chrome (cache-proxy responses only)
//! 3. promote lazy-load image attributes / resolve image URLs
//! 4. synthesize figure images from `<source srcset>`
//! 5. drop `<aside>` elements
//! 6. absolutize `/picture-gallery` links
//!
//! Rewriting never fails: malformed markup is parsed leniently and an
//! unparseable base URL only disables URL resolution.

pub mod rules;

use crate::dom;
use crate::encoding::decode_body;
use dom_query::Selection;
use tracing::debug;
use url::Url;

/// Where the body being rewritten came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The origin site itself.
    Direct,
    /// A cache or archive mirror, which injects chrome of its own.
    CacheProxy,
}

/// What each rule touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub scripts_removed: usize,
    pub chrome_removed: usize,
    pub images_rewritten: usize,
    pub figures_synthesized: usize,
    pub asides_removed: usize,
    pub gallery_links_rewritten: usize,
}

/// A parsed, rewritten document together with the base URL it was resolved
/// against.
///
/// Holds a `dom_query` tree, which is not `Send`; it is meant to be rendered
/// on the thread that produced it.
pub struct Document {
    tree: dom::Document,
    base_url: String,
    origin: Origin,
    stats: RewriteStats,
}

impl Document {
    /// Base URL relative references were resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    #[must_use]
    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &dom::Document {
        &self.tree
    }

    /// CSS selection over the rewritten tree.
    #[must_use]
    pub fn select(&self, css: &str) -> Selection<'_> {
        self.tree.select(css)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("base_url", &self.base_url)
            .field("origin", &self.origin)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Rewrite a raw body. The charset is taken from the markup itself (or
/// UTF-8); use [`rewrite_html`] when the response header already settled it.
///
/// # Example
///
/// ```rust
/// use hidewall::rewrite::{rewrite, Origin};
///
/// let doc = rewrite(
///     br#"<p>Hi<script>paywall()</script></p><img src="/p.png">"#,
///     "https://example.com/a",
///     Origin::Direct,
/// );
/// assert_eq!(doc.select("script").length(), 0);
/// assert_eq!(doc.select("img").attr("src").as_deref(), Some("https://example.com/p.png"));
/// ```
#[must_use]
pub fn rewrite(body: &[u8], base_url: &str, origin: Origin) -> Document {
    rewrite_html(&decode_body(body, None), base_url, origin)
}

/// Rewrite already-decoded markup.
#[must_use]
pub fn rewrite_html(html: &str, base_url: &str, origin: Origin) -> Document {
    let tree = dom::parse(html);
    let base = Url::parse(base_url).ok();
    if base.is_none() {
        debug!("Base URL {base_url:?} does not parse; URLs left unresolved");
    }
    let base = base.as_ref();

    let mut stats = RewriteStats {
        scripts_removed: rules::strip_scripts(&tree),
        ..RewriteStats::default()
    };
    if origin == Origin::CacheProxy {
        stats.chrome_removed = rules::remove_chrome_markers(&tree);
    }
    stats.images_rewritten = rules::rewrite_images(&tree, base);
    stats.figures_synthesized = rules::synthesize_figure_images(&tree, base);
    stats.asides_removed = rules::drop_asides(&tree);
    stats.gallery_links_rewritten = rules::absolutize_gallery_links(&tree, base);

    debug!("Rewrote {base_url}: {stats:?}");

    Document {
        tree,
        base_url: base_url.to_string(),
        origin,
        stats,
    }
}
