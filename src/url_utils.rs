//! URL Utility Functions
//!
//! Validation of caller-supplied target URLs, derivation of the clean URL used
//! for blocklist matching, and base-relative resolution of the URLs found in
//! rewritten markup.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Longest target URL accepted from a caller.
pub const MAX_URL_LEN: usize = 2048;

/// Syntactic shape of an acceptable target URL: scheme, dotted host with an
/// alphabetic final label, optional port, then path/query/fragment drawn from
/// a conservative character set.
#[allow(clippy::expect_used)]
static TARGET_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}(?::[0-9]{1,5})?(?:[/?#][-A-Za-z0-9+&@#/%=~_|!:,.;?]*)?$",
    )
    .expect("valid regex")
});

/// Host suffixes that only make sense on a private network.
const LOCAL_HOST_SUFFIXES: &[&str] = &[".local", ".localhost", ".internal"];

/// Check whether a caller-supplied string is an acceptable target URL.
///
/// This is a syntactic gate only: no DNS lookup, no reachability check.
/// Empty input, missing scheme, whitespace and control characters are all
/// rejected, as are hosts reserved for private networks.
///
/// # Examples
/// ```
/// use hidewall::url_utils::validate;
///
/// assert!(validate("https://www.example.com/news/story?id=3#top"));
/// assert!(!validate("example.com/news"));
/// assert!(!validate("https://exa mple.com/"));
/// ```
#[must_use]
pub fn validate(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_URL_LEN {
        return false;
    }
    if !TARGET_URL_RE.is_match(s) {
        return false;
    }
    !host_of(s).is_some_and(|host| is_local_host(&host))
}

/// Lowercased host portion of an `http(s)://` URL string, without port.
#[must_use]
pub fn host_of(url_str: &str) -> Option<String> {
    let rest = url_str
        .strip_prefix("https://")
        .or_else(|| url_str.strip_prefix("http://"))?;
    let end = rest.find([':', '/', '?', '#']).unwrap_or(rest.len());
    let host = &rest[..end];
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

fn is_local_host(host: &str) -> bool {
    LOCAL_HOST_SUFFIXES
        .iter()
        .any(|suffix| host.ends_with(suffix) || host == &suffix[1..])
}

/// Strip the query string and fragment from a URL.
///
/// Everything from the first `?` or `#` onwards is dropped.
#[must_use]
pub fn strip_query_and_fragment(url_str: &str) -> &str {
    let end = url_str.find(['?', '#']).unwrap_or(url_str.len());
    &url_str[..end]
}

/// A validated target, as supplied by the caller and in clean form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRequest {
    raw_query: String,
    clean_url: String,
}

impl TargetRequest {
    /// Validate a raw caller-supplied query and derive its clean URL.
    ///
    /// Surrounding whitespace is trimmed first. An empty query is
    /// [`Error::MissingUrl`]; anything [`validate`] rejects is
    /// [`Error::InvalidUrl`].
    pub fn new(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::MissingUrl);
        }
        if !validate(raw) {
            return Err(Error::InvalidUrl(raw.to_string()));
        }
        Ok(Self {
            raw_query: raw.to_string(),
            clean_url: strip_query_and_fragment(raw).to_string(),
        })
    }

    /// The query exactly as validated.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// The query without query string or fragment.
    #[must_use]
    pub fn clean_url(&self) -> &str {
        &self.clean_url
    }
}

/// Check if a string is a valid absolute URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form.
///
/// Scheme-relative (`//cdn/x`), root-relative (`/x`) and path-relative
/// (`x`, `../x`) inputs are resolved against `base`; absolute inputs and
/// special schemes are returned unchanged.
///
/// # Returns
/// * The absolute URL string, or the original if resolution fails
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    // Preserve special URLs unchanged
    if url_str.starts_with("data:")
        || url_str.starts_with("javascript:")
        || url_str.starts_with("mailto:")
        || url_str.starts_with("tel:")
    {
        return url_str.to_string();
    }

    let (is_abs, _) = is_absolute_url(url_str);
    if is_abs {
        return url_str.to_string();
    }

    match base.join(url_str) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Resolve every candidate URL of a `srcset` value, keeping descriptors.
///
/// # Examples
/// ```
/// use hidewall::url_utils::resolve_srcset;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/a/").unwrap();
/// assert_eq!(
///     resolve_srcset("s.jpg 1x, /l.jpg 2x", &base),
///     "https://example.com/a/s.jpg 1x, https://example.com/l.jpg 2x"
/// );
/// ```
#[must_use]
pub fn resolve_srcset(srcset: &str, base: &Url) -> String {
    let srcset = srcset.trim();
    // A data URI carries commas of its own; splitting it would corrupt it.
    if srcset.starts_with("data:") {
        return srcset.to_string();
    }

    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let mut out = create_absolute_url(url, base);
            for descriptor in parts {
                out.push(' ');
                out.push_str(descriptor);
            }
            Some(out)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// First URL token of a `srcset` value.
#[must_use]
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
}

/// Mirror endpoint for a clean URL: the mirror prefix followed by the
/// form-encoded URL (spaces as `+`, reserved characters percent-escaped).
#[must_use]
pub fn mirror_url(mirror_base: &str, clean_url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(clean_url.as_bytes()).collect();
    format!("{mirror_base}{encoded}")
}
