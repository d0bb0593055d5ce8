//! Configuration options for the bypass pipeline.
//!
//! The `Options` struct controls how blocked sites are retrieved, how long
//! outbound requests may take, and how the result is rendered. It is read
//! once at startup, usually from a TOML file, and shared read-only by every
//! request afterwards.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Generic desktop browser identity used for ordinary direct fetches and for
/// requests to the cache mirror.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Search-engine crawler identity used by the `crawler` policy.
pub const CRAWLER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

/// Default mirror that re-serves the latest snapshot of a page.
pub const DEFAULT_MIRROR_BASE: &str = "https://archive.today/latest/";

/// How a URL that matches the blocklist is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockedPolicy {
    /// Go through the cache/archive mirror.
    #[default]
    CacheProxy,
    /// Fetch the origin directly, presenting a search-crawler identity.
    Crawler,
}

/// What the boundary does with a cache-proxy plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProxyMode {
    /// Fetch the mirror copy, rewrite it and serve it.
    #[default]
    Fetch,
    /// Answer with a redirect to the mirror and skip the fetch entirely.
    Redirect,
}

/// Configuration options for the bypass pipeline.
///
/// All fields are public and every field has a default, so a TOML file only
/// needs the keys it wants to change.
///
/// # Example
///
/// ```rust
/// use hidewall::{BlockedPolicy, Options};
///
/// let options = Options {
///     blocked_policy: BlockedPolicy::Crawler,
///     direct_timeout_secs: 5,
///     ..Options::default()
/// };
/// assert_eq!(options.proxy_timeout_secs, 60);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Plain-text list of blocked-site substrings, one per line.
    ///
    /// Default: `blocked_sites.txt`
    pub blocklist_path: PathBuf,

    /// Retrieval policy for blocked sites.
    ///
    /// Default: `cache-proxy`
    pub blocked_policy: BlockedPolicy,

    /// Whether cache-proxy plans are fetched or answered with a redirect.
    ///
    /// Default: `fetch`
    pub proxy_mode: ProxyMode,

    /// Mirror prefix; the form-encoded target URL is appended to it.
    ///
    /// Default: `https://archive.today/latest/`
    pub mirror_base: String,

    /// Timeout for direct fetches, in seconds.
    ///
    /// Default: `10`
    pub direct_timeout_secs: u64,

    /// Timeout for cache-proxy fetches, in seconds. Mirrors are slow.
    ///
    /// Default: `60`
    pub proxy_timeout_secs: u64,

    /// Maximum number of redirects followed per fetch.
    ///
    /// Default: `10`
    pub max_redirects: usize,

    /// Follow redirects to targets the URL validator rejects, such as IP
    /// literals and `localhost`. Only test fixtures should need this.
    ///
    /// Default: `false`
    pub allow_private_redirects: bool,

    /// Response bodies are truncated beyond this many bytes.
    ///
    /// Default: `10 MiB`
    pub max_body_bytes: usize,

    /// Identity presented for ordinary direct fetches and mirror fetches.
    pub browser_user_agent: String,

    /// Identity presented under the `crawler` policy.
    pub crawler_user_agent: String,

    /// Send the caller's own User-Agent upstream on unblocked direct fetches.
    ///
    /// Off by default so the end user's browser fingerprint is not leaked.
    ///
    /// Default: `false`
    pub forward_client_user_agent: bool,

    /// Render an indented document instead of the parser's compact output.
    ///
    /// Default: `true`
    pub pretty: bool,

    /// Fallback log filter when `RUST_LOG` is unset.
    ///
    /// Default: `info`
    pub log_level: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            blocklist_path: PathBuf::from("blocked_sites.txt"),
            blocked_policy: BlockedPolicy::default(),
            proxy_mode: ProxyMode::default(),
            mirror_base: DEFAULT_MIRROR_BASE.to_string(),
            direct_timeout_secs: 10,
            proxy_timeout_secs: 60,
            max_redirects: 10,
            allow_private_redirects: false,
            max_body_bytes: 10 * 1024 * 1024,
            browser_user_agent: BROWSER_USER_AGENT.to_string(),
            crawler_user_agent: CRAWLER_USER_AGENT.to_string(),
            forward_client_user_agent: false,
            pretty: true,
            log_level: "info".to_string(),
        }
    }
}

impl Options {
    /// Parses options from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reads and parses a TOML options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&text)
    }
}
