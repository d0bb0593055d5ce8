//! Blocked-site list and matcher.
//!
//! The list is a plain-text file of site-identifying substrings, one per
//! line, loaded once at startup. Matching is literal, case-sensitive
//! substring containment against the clean URL; it is not domain-aware, so
//! entries should be specific enough (`nytimes.com`, not `times`).

use std::path::Path;
use tracing::{info, warn};

/// Immutable, ordered set of blocked-site substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedSiteSet {
    entries: Vec<String>,
}

impl BlockedSiteSet {
    /// Builds a set from already-cleaned entries. Empty entries are dropped,
    /// since an empty substring would match every URL.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parses list text: one entry per line, trimmed; blank lines and
    /// `#` comments skipped; order preserved.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(text.lines().filter_map(parse_line))
    }

    /// Loads the list from a file.
    ///
    /// A missing or unreadable file degrades to an empty set so that startup
    /// never fails on it; the condition is logged.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let set = Self::parse(&text);
                info!(
                    "Loaded {} blocked-site entries from {}",
                    set.len(),
                    path.display()
                );
                set
            }
            Err(e) => {
                warn!(
                    "Blocked-site list {} not readable ({e}); no site will be treated as blocked",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// First entry contained in `clean_url`, if any.
    #[must_use]
    pub fn matching_entry(&self, clean_url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| clean_url.contains(entry.as_str()))
            .map(String::as_str)
    }

    /// Entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(line)
    }
}

/// True iff some entry of `set` is a substring of `clean_url`.
#[must_use]
pub fn is_blocked(clean_url: &str, set: &BlockedSiteSet) -> bool {
    set.matching_entry(clean_url).is_some()
}
