//! Workflow error types.

use thiserror::Error;

use super::executor::ExecutionError;
use super::reference::{IssueReference, ReferenceError};
use crate::integrations::TrackerError;

/// Result type for workflow runs.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Why a workflow run stopped.
///
/// Every variant is terminal: nothing is retried and steps that already
/// completed (branch, commit) are left in place.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The issue argument was empty or not a `PROJECT-123` key.
    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),

    /// The tracker could not be reached or the issue was not found.
    #[error("Failed to fetch {reference}: {source}")]
    Fetch {
        reference: IssueReference,
        #[source]
        source: TrackerError,
    },

    /// A git command failed to start or exited non-zero.
    #[error("Failed to {step} for {reference}: {source}")]
    Execution {
        reference: IssueReference,
        step: &'static str,
        #[source]
        source: ExecutionError,
    },

    /// The tracker rejected the status change.
    #[error("Failed to move {reference} to '{status}': {source}")]
    Transition {
        reference: IssueReference,
        status: String,
        #[source]
        source: TrackerError,
    },
}

impl WorkflowError {
    /// The issue the run was working on, if the reference got that far.
    pub fn reference(&self) -> Option<&IssueReference> {
        match self {
            Self::InvalidReference(_) => None,
            Self::Fetch { reference, .. }
            | Self::Execution { reference, .. }
            | Self::Transition { reference, .. } => Some(reference),
        }
    }

    /// Short machine-friendly name of the failure kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidReference(_) => "invalid_reference",
            Self::Fetch { .. } => "fetch",
            Self::Execution { .. } => "execution",
            Self::Transition { .. } => "transition",
        }
    }
}
