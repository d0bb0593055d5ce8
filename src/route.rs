//! Route selection: how and as whom a target is retrieved.
//!
//! A plan is derived deterministically from the validated target, the
//! blocklist verdict and the deployment's [`Options`]. Its endpoint is always
//! built from the already-validated clean URL.

use crate::options::{BlockedPolicy, Options};
use crate::url_utils::{mirror_url, TargetRequest};
use std::time::Duration;

/// Referer presented by the crawler policy, as if arriving from a search result.
pub const SEARCH_REFERER: &str = "https://www.google.com/";

/// Retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Fetch the origin itself.
    Direct,
    /// Fetch a third-party mirror copy of the origin.
    CacheProxy,
}

/// Everything the fetcher needs for one outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPlan {
    pub strategy: Strategy,
    /// User-Agent presented upstream.
    pub identity: String,
    /// URL actually requested.
    pub endpoint: String,
    /// Upper bound on the whole request.
    pub timeout: Duration,
    /// Optional `Referer` header.
    pub referer: Option<String>,
}

/// Choose a retrieval plan for `request`.
///
/// * not blocked: direct fetch of the clean URL as a generic browser, or as
///   the caller's own browser when `forward_client_user_agent` is on;
/// * blocked under `cache-proxy`: mirror endpoint, browser identity, long timeout;
/// * blocked under `crawler`: direct fetch with the crawler identity and a
///   search-engine referer.
#[must_use]
pub fn plan(
    request: &TargetRequest,
    blocked: bool,
    options: &Options,
    client_user_agent: Option<&str>,
) -> RetrievalPlan {
    let clean_url = request.clean_url();
    let direct_timeout = Duration::from_secs(options.direct_timeout_secs);

    if !blocked {
        let identity = match client_user_agent.map(str::trim) {
            Some(ua) if options.forward_client_user_agent && !ua.is_empty() => ua.to_string(),
            _ => options.browser_user_agent.clone(),
        };
        return RetrievalPlan {
            strategy: Strategy::Direct,
            identity,
            endpoint: clean_url.to_string(),
            timeout: direct_timeout,
            referer: None,
        };
    }

    match options.blocked_policy {
        BlockedPolicy::CacheProxy => RetrievalPlan {
            strategy: Strategy::CacheProxy,
            identity: options.browser_user_agent.clone(),
            endpoint: mirror_url(&options.mirror_base, clean_url),
            timeout: Duration::from_secs(options.proxy_timeout_secs),
            referer: None,
        },
        BlockedPolicy::Crawler => RetrievalPlan {
            strategy: Strategy::Direct,
            identity: options.crawler_user_agent.clone(),
            endpoint: clean_url.to_string(),
            timeout: direct_timeout,
            referer: Some(SEARCH_REFERER.to_string()),
        },
    }
}
