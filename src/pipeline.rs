//! The bypass pipeline and its caller-facing boundary.
//!
//! Validator -> blocklist -> route -> fetch -> rewrite -> render. A [`Bypass`]
//! holds only read-only state (options, blocklist, HTTP client), so one
//! instance can serve any number of concurrent calls behind an `Arc`.

use crate::blocklist::BlockedSiteSet;
use crate::encoding::decode_body;
use crate::error::{Error, FetchErrorKind, Result};
use crate::fetch::{snapshot, Fetcher};
use crate::options::{Options, ProxyMode};
use crate::render::{render, render_compact};
use crate::rewrite::{rewrite_html, Origin};
use crate::route::{plan, Strategy};
use crate::url_utils::TargetRequest;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Content type of every successful page and of error messages.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Result of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The rewritten, rendered document.
    Page(String),
    /// The caller should be sent to this mirror URL instead.
    Redirect(String),
}

/// What the caller-facing layer sends back: never a raw error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Set for redirects only.
    pub location: Option<String>,
}

impl BypassResponse {
    fn page(html: String) -> Self {
        Self {
            status: 200,
            content_type: HTML_CONTENT_TYPE,
            body: html,
            location: None,
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            status: 302,
            content_type: TEXT_CONTENT_TYPE,
            body: format!("Redirecting to {location}"),
            location: Some(location),
        }
    }

    fn error(err: &Error) -> Self {
        Self {
            status: err.status_code(),
            content_type: TEXT_CONTENT_TYPE,
            body: err.public_message(),
            location: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// The bypass engine.
///
/// # Example
///
/// ```rust,no_run
/// use hidewall::{BlockedSiteSet, Bypass, Options};
///
/// # async fn run() -> hidewall::Result<()> {
/// let bypass = Bypass::new(Options::default(), BlockedSiteSet::new(["nytimes.com"]))?;
/// let response = bypass.handle(Some("https://example.com/story"), None).await;
/// println!("{} {}", response.status, response.body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Bypass {
    options: Options,
    blocked_sites: BlockedSiteSet,
    fetcher: Fetcher,
}

impl Bypass {
    pub fn new(options: Options, blocked_sites: BlockedSiteSet) -> Result<Self> {
        let fetcher = Fetcher::new(&options)?;
        Ok(Self {
            options,
            blocked_sites,
            fetcher,
        })
    }

    /// Builds an engine, loading the blocklist named by `options` once.
    pub fn from_options(options: Options) -> Result<Self> {
        let blocked_sites = BlockedSiteSet::load(&options.blocklist_path);
        Self::new(options, blocked_sites)
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn blocked_sites(&self) -> &BlockedSiteSet {
        &self.blocked_sites
    }

    /// Runs the pipeline and converts every outcome into a response.
    ///
    /// An absent or blank query answers 400 without touching the network.
    pub async fn handle(
        &self,
        raw_query: Option<&str>,
        client_user_agent: Option<&str>,
    ) -> BypassResponse {
        match self.bypass(raw_query.unwrap_or_default(), client_user_agent).await {
            Ok(Outcome::Page(html)) => BypassResponse::page(html),
            Ok(Outcome::Redirect(location)) => BypassResponse::redirect(location),
            Err(e) => {
                let response = BypassResponse::error(&e);
                match &e {
                    Error::MissingUrl | Error::InvalidUrl(_) => {
                        debug!("Rejected request ({}): {e}", response.status);
                    }
                    Error::Processing(_) | Error::Config(_) => {
                        error!("Request failed ({}): {e}", response.status);
                    }
                    Error::Fetch { .. } => warn!("Request failed ({}): {e}", response.status),
                }
                response
            }
        }
    }

    /// Runs the pipeline, returning typed errors.
    pub async fn bypass(
        &self,
        raw_query: &str,
        client_user_agent: Option<&str>,
    ) -> Result<Outcome> {
        let request = TargetRequest::new(raw_query)?;

        let matched = self.blocked_sites.matching_entry(request.clean_url());
        if let Some(entry) = matched {
            info!("{} is blocked (matched {entry:?})", request.clean_url());
        }

        let plan = plan(&request, matched.is_some(), &self.options, client_user_agent);
        debug!("Plan for {}: {:?} via {}", request.clean_url(), plan.strategy, plan.endpoint);

        if plan.strategy == Strategy::CacheProxy && self.options.proxy_mode == ProxyMode::Redirect {
            return Ok(Outcome::Redirect(plan.endpoint));
        }

        let fetched = self.fetcher.fetch(&plan).await?;
        let html = decode_body(&fetched.body, fetched.content_type());

        let origin = match plan.strategy {
            Strategy::Direct => Origin::Direct,
            Strategy::CacheProxy => Origin::CacheProxy,
        };
        let rendered = process(&html, request.clean_url(), origin, self.options.pretty)?;
        Ok(Outcome::Page(rendered))
    }
}

/// Parse, rewrite and render in one synchronous step, so the non-`Send` tree
/// never crosses an await point. A panic inside the parser is reported as a
/// processing error instead of tearing down the caller.
///
/// A mirror copy that is really the mirror's own search or landing page is a
/// fetch failure.
fn process(html: &str, base_url: &str, origin: Origin, pretty: bool) -> Result<String> {
    catch_unwind(AssertUnwindSafe(|| {
        let placeholder = (origin == Origin::CacheProxy)
            .then(|| snapshot::placeholder_reason(html))
            .flatten();
        if let Some(reason) = placeholder {
            return Err(Error::fetch(
                FetchErrorKind::Other,
                format!("mirror has no snapshot of {base_url} ({reason})"),
            ));
        }

        let doc = rewrite_html(html, base_url, origin);
        Ok(if pretty {
            render(&doc)
        } else {
            render_compact(&doc)
        })
    }))
    .map_err(|panic| {
        let detail = panic
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Error::Processing(format!("rewriting {base_url} panicked: {detail}"))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(options: Options, blocked: &[&str]) -> Bypass {
        Bypass::new(options, BlockedSiteSet::new(blocked.iter().copied())).unwrap()
    }

    #[test]
    fn test_bypass_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Bypass>();
    }

    #[test]
    fn test_handle_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}
        let bypass = engine(Options::default(), &[]);
        let fut = bypass.handle(Some("https://example.com/"), None);
        assert_send(&fut);
    }

    #[tokio::test]
    async fn test_missing_query_is_bad_request() {
        let bypass = engine(Options::default(), &[]);

        for query in [None, Some(""), Some("   ")] {
            let response = bypass.handle(query, None).await;
            assert_eq!(response.status, 400);
            assert_eq!(response.body, "no URL provided");
            assert!(response.location.is_none());
        }
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        let bypass = engine(Options::default(), &[]);
        let response = bypass.handle(Some("javascript:alert(1)"), None).await;

        assert_eq!(response.status, 400);
        assert!(response.body.starts_with("invalid URL provided"));
    }

    #[tokio::test]
    async fn test_redirect_mode_skips_fetch() {
        let options = Options {
            proxy_mode: ProxyMode::Redirect,
            ..Options::default()
        };
        let bypass = engine(options, &["nytimes.com"]);
        let response = bypass
            .handle(Some("https://www.nytimes.com/2024/story.html?smid=tw"), None)
            .await;

        assert_eq!(response.status, 302);
        assert_eq!(
            response.location.as_deref(),
            Some("https://archive.today/latest/https%3A%2F%2Fwww.nytimes.com%2F2024%2Fstory.html")
        );
    }

    #[test]
    fn test_process_pretty_and_compact() {
        let html = r#"<p>x</p><script>gate()</script><img src="/p.png">"#;

        let Ok(pretty) = process(html, "https://example.com/a", Origin::Direct, true) else {
            panic!("processing should succeed");
        };
        assert!(pretty.contains(r#"<img src="https://example.com/p.png">"#));
        assert!(!pretty.contains("script"));

        let Ok(compact) = process(html, "https://example.com/a", Origin::Direct, false) else {
            panic!("processing should succeed");
        };
        assert!(compact.contains(r#"<p>x</p><img src="https://example.com/p.png">"#));
    }

    #[test]
    fn test_mirror_search_page_is_fetch_error() {
        let html = r#"<form id="search_form"><input name="q"></form><p>Enter a URL to search</p>"#;

        let Err(err) = process(html, "https://example.com/a", Origin::CacheProxy, true) else {
            panic!("search page is not a snapshot");
        };
        assert_eq!(err.fetch_kind(), Some(FetchErrorKind::Other));
        assert_eq!(err.status_code(), 502);

        // The same markup fetched directly is served as-is.
        assert!(process(html, "https://example.com/a", Origin::Direct, true).is_ok());
    }
}
