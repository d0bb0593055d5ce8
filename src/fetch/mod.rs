//! Content fetcher: one outbound GET per plan.
//!
//! The client never decompresses on its own; the body is read raw, capped at
//! `max_body_bytes`, and then decoded by [`decompress::decompress`] according
//! to the response's `Content-Encoding`. The decoded body is held to the same
//! cap. Every redirect hop must pass [`validate`] unless
//! `allow_private_redirects` is set.

pub mod decompress;
pub mod snapshot;

use crate::error::{Error, FetchErrorKind, Result};
use crate::options::Options;
use crate::route::RetrievalPlan;
use crate::url_utils::validate;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Browser-like headers sent with every request, besides the User-Agent.
const STATIC_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.5"),
    ("accept-encoding", "gzip, deflate, br"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "max-age=0"),
];

/// Successful upstream response.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Upstream status code (always 2xx/3xx here).
    pub status: u16,
    /// Response headers; lookups are case-insensitive.
    pub headers: HeaderMap,
    /// Decompressed body.
    pub body: Vec<u8>,
    /// Whether the body was cut at the size limit.
    pub truncated: bool,
}

impl FetchResult {
    /// Header value as text, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }
}

/// Shared HTTP client. Cheap to clone; safe to use from many tasks at once.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl Fetcher {
    /// Builds the client: bounded, validated redirects and no automatic
    /// decompression.
    pub fn new(options: &Options) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(redirect_policy(
                options.max_redirects,
                options.allow_private_redirects,
            ))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_body_bytes: options.max_body_bytes,
        })
    }

    /// Performs the plan's GET and returns the decompressed body.
    ///
    /// Fails with [`Error::Fetch`] on timeout, connection failure, a 4xx/5xx
    /// answer, a redirect to a rejected URL, or any other transport error.
    /// No retries.
    pub async fn fetch(&self, plan: &RetrievalPlan) -> Result<FetchResult> {
        let started = Instant::now();
        debug!("GET {} ({:?}, timeout {:?})", plan.endpoint, plan.strategy, plan.timeout);

        let mut request = self
            .client
            .get(&plan.endpoint)
            .timeout(plan.timeout)
            .header(header::USER_AGENT, identity_header(&plan.identity)?);
        for (name, value) in STATIC_HEADERS {
            request = request.header(*name, *value);
        }
        if let Some(referer) = &plan.referer {
            request = request.header(header::REFERER, referer.as_str());
        }

        let mut response = request.send().await.map_err(classify)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::fetch(
                FetchErrorKind::HttpStatus(status.as_u16()),
                format!("{} answered {status}", plan.endpoint),
            ));
        }

        let headers = response.headers().clone();
        let mut raw = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            let room = self.max_body_bytes - raw.len();
            if chunk.len() > room {
                raw.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            raw.extend_from_slice(&chunk);
        }
        if truncated {
            warn!(
                "Body of {} truncated at {} bytes",
                plan.endpoint, self.max_body_bytes
            );
        }

        let encoding = headers
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok());
        let decoded = decompress::decompress(raw, encoding, self.max_body_bytes, truncated);

        info!(
            "Fetched {} -> {} ({} bytes in {:?})",
            plan.endpoint,
            status.as_u16(),
            decoded.body.len(),
            started.elapsed()
        );

        Ok(FetchResult {
            status: status.as_u16(),
            headers,
            body: decoded.body,
            truncated: decoded.truncated,
        })
    }
}

/// Hop limit plus the caller-input URL check on every hop.
fn redirect_policy(max_redirects: usize, allow_private: bool) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error(format!("more than {max_redirects} redirects"));
        }
        if !allow_private && !validate(attempt.url().as_str()) {
            let target = attempt.url().to_string();
            warn!("Refusing redirect to {target}");
            return attempt.error(format!("redirect to rejected URL {target}"));
        }
        attempt.follow()
    })
}

fn identity_header(identity: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(identity)
        .map_err(|_| Error::Config(format!("user agent is not a valid header value: {identity:?}")))
}

/// Map a transport error onto the fetch failure classes.
fn classify(e: reqwest::Error) -> Error {
    let kind = if e.is_timeout() {
        FetchErrorKind::Timeout
    } else if e.is_connect() {
        FetchErrorKind::ConnectionRefused
    } else if let Some(status) = e.status() {
        FetchErrorKind::HttpStatus(status.as_u16())
    } else {
        FetchErrorKind::Other
    };
    Error::fetch(kind, e.to_string())
}
