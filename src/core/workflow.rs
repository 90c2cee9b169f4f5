//! The start-work workflow.
//!
//! Runs the steps for one issue in a fixed order:
//!
//! ```text
//! Start -> ReferenceParsed -> IssueFetched -> BranchCreated -> CommitMade
//!       -> TransitionAttempted -> Done
//! ```
//!
//! Any step can fail, which ends the run in `Failed`. There are no retries and
//! nothing is rolled back.

use std::fmt;

use super::config::RunConfig;
use super::error::{WorkflowError, WorkflowResult};
use super::executor::{build_checkout, build_commit, CommandLine, CommandRunner, StepOutcome};
use super::normalize::{classify, Category, NamingRules};
use super::reference::IssueReference;
use crate::integrations::{Issue, IssueTracker, Transition};

/// Line between the commit header and the issue link.
pub const COMMIT_SEPARATOR: &str = "\t";

/// Where a workflow run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    ReferenceParsed,
    IssueFetched,
    BranchCreated,
    CommitMade,
    TransitionAttempted,
    Done,
    Failed,
}

impl WorkflowState {
    /// Check if no further transition can happen.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// The branch to create for an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSpec {
    /// feature or bug
    pub category: Category,
    /// Issue key
    pub issue_id: String,
    /// Normalized title, may be empty
    pub slug: String,
}

impl BranchSpec {
    /// Derive the branch for `issue` using `rules`.
    pub fn for_issue(reference: &IssueReference, issue: &Issue, rules: &NamingRules) -> Self {
        Self {
            category: classify(&issue.type_name),
            issue_id: reference.to_string(),
            slug: rules.slugify(&issue.title),
        }
    }
}

impl fmt::Display for BranchSpec {
    /// `<category>/<issue>_<slug>`, or `<category>/<issue>` when the slug is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slug.is_empty() {
            write!(f, "{}/{}", self.category, self.issue_id)
        } else {
            write!(f, "{}/{}_{}", self.category, self.issue_id, self.slug)
        }
    }
}

/// The initial commit message, one entry per `-m` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSpec {
    lines: Vec<String>,
}

impl CommitSpec {
    /// `[<issue>] <title>`, a tab line, then the issue URL.
    pub fn new(reference: &IssueReference, title: &str, issue_url: &str) -> Self {
        Self {
            lines: vec![
                format!("[{}] {}", reference, title),
                COMMIT_SEPARATOR.to_string(),
                issue_url.to_string(),
            ],
        }
    }

    /// First line of the message.
    pub fn header(&self) -> &str {
        &self.lines[0]
    }

    /// All message lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// What happened on the tracker side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was applied
    Applied { id: String, status: String },
    /// Dry run: the transition would have been applied
    Simulated { id: String, status: String },
    /// None of the target statuses is reachable right now (e.g. already in progress)
    NotAvailable,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    /// Issue that was worked on
    pub reference: IssueReference,
    /// Issue as fetched from the tracker
    pub issue: Issue,
    /// Branch that was created
    pub branch: BranchSpec,
    /// Commit that was made
    pub commit: CommitSpec,
    /// Every git command handed to the runner, with what happened to it
    pub steps: Vec<(CommandLine, StepOutcome)>,
    /// Tracker status change
    pub transition: TransitionOutcome,
}

/// Orchestrates one run against a tracker and a command runner.
pub struct Workflow<'a> {
    tracker: &'a dyn IssueTracker,
    runner: &'a dyn CommandRunner,
    config: &'a RunConfig,
}

impl<'a> Workflow<'a> {
    /// Create a new workflow.
    pub fn new(
        tracker: &'a dyn IssueTracker,
        runner: &'a dyn CommandRunner,
        config: &'a RunConfig,
    ) -> Self {
        Self { tracker, runner, config }
    }

    /// Run every step for the issue named by `raw`.
    pub async fn run(&self, raw: &str) -> WorkflowResult<WorkflowReport> {
        let mut state = WorkflowState::Start;

        match self.run_steps(raw, &mut state).await {
            Ok(report) => {
                advance(&mut state, WorkflowState::Done);
                Ok(report)
            }
            Err(err) => {
                advance(&mut state, WorkflowState::Failed);
                Err(err)
            }
        }
    }

    async fn run_steps(
        &self,
        raw: &str,
        state: &mut WorkflowState,
    ) -> WorkflowResult<WorkflowReport> {
        let reference = IssueReference::parse(raw)?;
        advance(state, WorkflowState::ReferenceParsed);

        let issue = self
            .tracker
            .fetch_issue(&reference)
            .await
            .map_err(|source| WorkflowError::Fetch { reference: reference.clone(), source })?;
        tracing::debug!(
            issue = %reference,
            title = %issue.title,
            issue_type = %issue.type_name,
            "Fetched issue"
        );
        advance(state, WorkflowState::IssueFetched);

        let mut steps = Vec::with_capacity(2);

        let branch = BranchSpec::for_issue(&reference, &issue, &self.config.naming);
        let checkout = build_checkout(&branch.to_string());
        let outcome = self.execute(&reference, "create branch", &checkout)?;
        steps.push((checkout, outcome));
        advance(state, WorkflowState::BranchCreated);

        let commit = CommitSpec::new(&reference, &issue.title, &self.config.browse_url(&reference));
        let commit_cmd = build_commit(commit.lines());
        let outcome = self.execute(&reference, "commit", &commit_cmd)?;
        steps.push((commit_cmd, outcome));
        advance(state, WorkflowState::CommitMade);

        let transition = self.transition(&reference).await?;
        advance(state, WorkflowState::TransitionAttempted);

        Ok(WorkflowReport { reference, issue, branch, commit, steps, transition })
    }

    fn execute(
        &self,
        reference: &IssueReference,
        step: &'static str,
        command: &CommandLine,
    ) -> WorkflowResult<StepOutcome> {
        self.runner.execute(command, self.config.mode).map_err(|source| WorkflowError::Execution {
            reference: reference.clone(),
            step,
            source,
        })
    }

    async fn transition(&self, reference: &IssueReference) -> WorkflowResult<TransitionOutcome> {
        let transitions = self
            .tracker
            .list_transitions(reference)
            .await
            .map_err(|source| WorkflowError::Fetch { reference: reference.clone(), source })?;

        let Some((status, transition)) = pick_transition(&self.config.target_statuses, &transitions)
        else {
            tracing::info!(
                issue = %reference,
                targets = ?self.config.target_statuses,
                "No matching transition available, leaving status unchanged"
            );
            return Ok(TransitionOutcome::NotAvailable);
        };

        let id = transition.id.clone();
        let status = status.to_string();

        if self.config.mode.is_dry_run() {
            tracing::info!(
                issue = %reference,
                transition = %id,
                %status,
                "[DRY RUN] Would transition issue"
            );
            return Ok(TransitionOutcome::Simulated { id, status });
        }

        self.tracker.apply_transition(reference, &id).await.map_err(|source| {
            WorkflowError::Transition {
                reference: reference.clone(),
                status: status.clone(),
                source,
            }
        })?;
        tracing::info!(issue = %reference, %status, "Moved issue");

        Ok(TransitionOutcome::Applied { id, status })
    }
}

/// First transition matching a target status, targets checked in order.
pub fn pick_transition<'t, 's>(
    targets: &'s [String],
    transitions: &'t [Transition],
) -> Option<(&'s str, &'t Transition)> {
    targets.iter().find_map(|status| {
        transitions.iter().find(|t| t.targets(status)).map(|t| (status.as_str(), t))
    })
}

fn advance(state: &mut WorkflowState, next: WorkflowState) {
    debug_assert!(!state.is_terminal(), "workflow already finished in {state:?}");
    tracing::debug!(from = ?state, to = ?next, "Workflow state");
    *state = next;
}
