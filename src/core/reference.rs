//! Issue reference parsing.
//!
//! Users pass either a bare key (`ABC-123`) or something path-like that ends
//! in one, such as a browse URL copied from the tracker.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// A project key, a hyphen and a number. `\S+` is greedy, so keys that
/// contain hyphens themselves are accepted.
static ISSUE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+-\d+$").unwrap());

/// Result type for reference parsing.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Why a raw reference was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("The supplied issue is empty")]
    Empty,

    #[error("Incorrect issue format: {0} (expected PROJECT-123)")]
    Malformed(String),
}

/// A validated `<project-key>-<number>` issue identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueReference(String);

impl IssueReference {
    /// Parse a bare key or the last `/`-separated segment of a path or URL.
    pub fn parse(raw: &str) -> ReferenceResult<Self> {
        let segment = raw.rsplit('/').next().unwrap_or_default().trim();

        if segment.is_empty() {
            return Err(ReferenceError::Empty);
        }

        if !ISSUE_KEY_PATTERN.is_match(segment) {
            return Err(ReferenceError::Malformed(segment.to_string()));
        }

        Ok(Self(segment.to_string()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IssueReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
