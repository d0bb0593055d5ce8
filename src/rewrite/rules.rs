//! The individual rewrite rules, applied in order by [`super::rewrite`].
//!
//! Each rule mutates the tree in place and returns how many elements it
//! touched. Resolution rules take the base URL as an `Option`: without a
//! parseable base, values are left as they are.

use crate::dom::{self, Document, Selection};
use crate::url_utils::{create_absolute_url, first_srcset_url, resolve_srcset};
use url::Url;

/// Elements injected by cache and archive providers around the mirrored page.
const CHROME_MARKER_SELECTOR: &str = r#"[id*="google-cache-hdr"], [id*="wm-ipp"], [id*="HEADER"]"#;

/// Lazy-load attributes used by some publishers instead of `src`/`srcset`.
const LAZY_SRC: &str = "data-gl-src";
const LAZY_SRCSET: &str = "data-gl-srcset";

const GALLERY_LINK_SELECTOR: &str = r#"a[href^="/picture-gallery"]"#;

/// Rule 1: remove every `<script>` with its content.
pub fn strip_scripts(doc: &Document) -> usize {
    dom::remove_all(&doc.select("script"))
}

/// Rule 2: remove banner/header elements added by the cache provider.
/// Matching on `id` is a case-sensitive substring test.
pub fn remove_chrome_markers(doc: &Document) -> usize {
    dom::remove_all(&doc.select(CHROME_MARKER_SELECTOR))
}

/// Rule 3: promote lazy-load sources and resolve image URLs.
///
/// An `<img>` carrying `data-gl-src` or `data-gl-srcset` takes its `src` /
/// `srcset` from them and loses the `data-gl-*` attributes. Whatever `src`
/// and `srcset` the image ends up with are then resolved against the base.
pub fn rewrite_images(doc: &Document, base: Option<&Url>) -> usize {
    let mut rewritten = 0;
    for node in doc.select("img").nodes() {
        let img = Selection::from(*node);
        let mut changed = false;

        if let Some(src) = dom::get_attribute(&img, LAZY_SRC) {
            dom::set_attribute(&img, "src", &src);
            dom::remove_attribute(&img, LAZY_SRC);
            changed = true;
        }
        if let Some(srcset) = dom::get_attribute(&img, LAZY_SRCSET) {
            dom::set_attribute(&img, "srcset", &srcset);
            dom::remove_attribute(&img, LAZY_SRCSET);
            changed = true;
        }
        changed |= resolve_attribute(&img, "src", |v| resolve(v, base));
        changed |= resolve_attribute(&img, "srcset", |v| resolve_set(v, base));

        if changed {
            rewritten += 1;
        }
    }
    rewritten
}

/// Rule 4: recover a figure's image from its responsive `<source>` markup.
///
/// The first URL of the first non-empty `<source srcset>` becomes the `src`
/// of the figure's `<img>`, or of a new `<img>` appended to the figure.
pub fn synthesize_figure_images(doc: &Document, base: Option<&Url>) -> usize {
    let mut synthesized = 0;
    for node in doc.select("figure").nodes() {
        let figure = Selection::from(*node);

        let candidate = figure.select("source[srcset]").nodes().iter().find_map(|source| {
            let srcset = dom::get_attribute(&Selection::from(*source), "srcset")?;
            first_srcset_url(&srcset).map(|url| resolve(url, base))
        });
        let Some(src) = candidate else {
            continue;
        };

        let images = figure.select("img");
        if images.length() > 0 {
            dom::set_attribute(&images, "src", &src);
        } else {
            dom::append_html(&figure, &format!(r#"<img src="{}">"#, dom::escape_html(&src)));
        }
        synthesized += 1;
    }
    synthesized
}

/// Rule 5: remove every `<aside>`.
pub fn drop_asides(doc: &Document) -> usize {
    dom::remove_all(&doc.select("aside"))
}

/// Rule 6: make site-relative gallery links absolute.
pub fn absolutize_gallery_links(doc: &Document, base: Option<&Url>) -> usize {
    let mut rewritten = 0;
    for node in doc.select(GALLERY_LINK_SELECTOR).nodes() {
        let link = Selection::from(*node);
        if resolve_attribute(&link, "href", |v| resolve(v, base)) {
            rewritten += 1;
        }
    }
    rewritten
}

fn resolve(value: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => create_absolute_url(value, base),
        None => value.to_string(),
    }
}

fn resolve_set(value: &str, base: Option<&Url>) -> String {
    match base {
        Some(base) => resolve_srcset(value, base),
        None => value.to_string(),
    }
}

/// Rewrites one attribute through `f`; true if the stored value changed.
fn resolve_attribute(sel: &Selection, name: &str, f: impl Fn(&str) -> String) -> bool {
    let Some(current) = dom::get_attribute(sel, name) else {
        return false;
    };
    let resolved = f(&current);
    if resolved == current {
        return false;
    }
    dom::set_attribute(sel, name, &resolved);
    true
}
