//! # git-jira
//!
//! Start work on a Jira issue from your terminal.
//!
//! Given an issue key (or a URL ending in one), git-jira fetches the issue,
//! creates a branch named after it, makes an empty commit that links back to
//! the ticket and moves the ticket to "In Progress".
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install git-jira
//!
//! # Credentials (or pass --username/--token/--base-url)
//! export JIRA_USERNAME=you@example.com
//! export JIRA_API_TOKEN=...
//! export JIRA_BASE_URL=mycompany.atlassian.net
//!
//! # See what would happen
//! git jira ABC-123 --dry-run
//!
//! # Do it
//! git jira ABC-123
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::ref_option)]

pub mod core;
pub mod integrations;

pub use crate::core::{
    BranchSpec, Category, CommandLine, CommandRunner, CommitSpec, Config, ExecutionMode, Executor,
    IssueReference, NamingRules, RunConfig, TransitionOutcome, Workflow, WorkflowError,
    WorkflowReport,
};
pub use crate::integrations::{
    Issue, IssueTracker, JiraClient, JiraCredentials, TrackerError, TrackerResult, Transition,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "git-jira";
