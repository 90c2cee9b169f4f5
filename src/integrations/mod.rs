//! Issue tracker integrations.
//!
//! The workflow only needs three things from a tracker: read an issue, list
//! the transitions currently available on it and apply one of them.

pub mod jira;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::IssueReference;

pub use jira::{JiraClient, JiraCredentials};

/// An issue as the workflow sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-internal ID
    pub id: String,
    /// Issue key (e.g., "ABC-123")
    pub key: String,
    /// Issue title (Jira "summary")
    pub title: String,
    /// Issue type name (e.g., "Story", "Bug")
    pub type_name: String,
    /// API link to the issue
    pub self_link: String,
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Transition ID
    pub id: String,
    /// Transition name (e.g., "Start Progress")
    pub name: String,
    /// Name of the status the transition leads to
    pub to: Option<String>,
}

impl Transition {
    /// Check whether this transition is called `status` or leads to it.
    pub fn targets(&self, status: &str) -> bool {
        self.name.eq_ignore_ascii_case(status)
            || self.to.as_deref().is_some_and(|to| to.eq_ignore_ascii_case(status))
    }
}

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error types for tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tracker API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed, check the username and API token")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Access to an issue tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch the issue behind `reference`.
    async fn fetch_issue(&self, reference: &IssueReference) -> TrackerResult<Issue>;

    /// List the transitions available on the issue, in tracker order.
    async fn list_transitions(&self, reference: &IssueReference) -> TrackerResult<Vec<Transition>>;

    /// Apply a transition by ID.
    async fn apply_transition(
        &self,
        reference: &IssueReference,
        transition_id: &str,
    ) -> TrackerResult<()>;
}
