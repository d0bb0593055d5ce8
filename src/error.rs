//! Error types for hidewall.
//!
//! Every failure the pipeline can produce is one variant of [`Error`]. The
//! caller-facing boundary converts them into a status code and a plain
//! message via [`Error::status_code`] and [`Error::public_message`]; nothing
//! else about an error is shown to the caller.

use std::fmt;

/// Classification of an outbound fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request exceeded the plan's timeout.
    Timeout,
    /// DNS resolution or the TCP/TLS connect failed.
    ConnectionRefused,
    /// The upstream answered with a 4xx or 5xx status.
    HttpStatus(u16),
    /// Anything else: body read failure, too many or rejected redirects, or a
    /// mirror answer that is not a snapshot.
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionRefused => write!(f, "connection failure"),
            Self::HttpStatus(code) => write!(f, "HTTP {code}"),
            Self::Other => write!(f, "network error"),
        }
    }
}

/// Error type for bypass operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller supplied no URL at all.
    #[error("no URL provided")]
    MissingUrl,

    /// The caller supplied a string that is not an acceptable HTTP(S) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The outbound fetch failed.
    #[error("fetch failed ({kind}): {message}")]
    Fetch {
        /// Failure class, used for status mapping.
        kind: FetchErrorKind,
        /// Detail for the server-side log.
        message: String,
    },

    /// Parsing, rewriting or rendering failed unexpectedly.
    #[error("processing failed: {0}")]
    Processing(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Builds a fetch error of the given kind.
    pub fn fetch(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self::Fetch {
            kind,
            message: message.into(),
        }
    }

    /// The fetch failure class, if this is a fetch error.
    #[must_use]
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// HTTP status the caller-facing layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingUrl | Self::InvalidUrl(_) => 400,
            Self::Fetch { kind, .. } => match kind {
                FetchErrorKind::Timeout => 504,
                FetchErrorKind::ConnectionRefused => 503,
                FetchErrorKind::HttpStatus(_) | FetchErrorKind::Other => 502,
            },
            Self::Processing(_) | Self::Config(_) => 500,
        }
    }

    /// Human-readable message safe to show to the caller.
    ///
    /// Never includes internal error chains; those go to the log only.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingUrl => "no URL provided".to_string(),
            Self::InvalidUrl(_) => {
                "invalid URL provided; please supply a valid http or https URL".to_string()
            }
            Self::Fetch { kind, .. } => match kind {
                FetchErrorKind::Timeout => "the upstream site took too long to respond".to_string(),
                FetchErrorKind::ConnectionRefused => {
                    "the upstream site could not be reached".to_string()
                }
                FetchErrorKind::HttpStatus(code) => {
                    format!("the upstream site returned an error (HTTP {code})")
                }
                FetchErrorKind::Other => "the upstream site could not be fetched".to_string(),
            },
            Self::Processing(_) | Self::Config(_) => {
                "an unexpected error occurred while processing the page".to_string()
            }
        }
    }
}

/// Result type alias for bypass operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_bad_request() {
        assert_eq!(Error::MissingUrl.status_code(), 400);
        assert_eq!(Error::InvalidUrl("ftp://x".into()).status_code(), 400);
        assert_eq!(Error::MissingUrl.public_message(), "no URL provided");
    }

    #[test]
    fn fetch_errors_map_by_kind() {
        assert_eq!(Error::fetch(FetchErrorKind::Timeout, "t").status_code(), 504);
        assert_eq!(
            Error::fetch(FetchErrorKind::ConnectionRefused, "c").status_code(),
            503
        );
        assert_eq!(
            Error::fetch(FetchErrorKind::HttpStatus(404), "h").status_code(),
            502
        );
        assert_eq!(Error::fetch(FetchErrorKind::Other, "o").status_code(), 502);
    }

    #[test]
    fn upstream_code_is_surfaced_in_message() {
        let err = Error::fetch(FetchErrorKind::HttpStatus(403), "forbidden by origin");
        assert!(err.public_message().contains("403"));
        assert!(!err.public_message().contains("forbidden by origin"));
    }

    #[test]
    fn processing_errors_hide_details() {
        let err = Error::Processing("stack of internal detail".into());
        assert_eq!(err.status_code(), 500);
        assert!(!err.public_message().contains("internal detail"));
    }
}
