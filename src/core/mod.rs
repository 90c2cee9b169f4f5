//! Core types and functionality for git-jira.
//!
//! This module contains the naming rules, issue reference parsing, command
//! execution and the workflow that ties them together.

mod config;
mod error;
mod executor;
mod normalize;
mod reference;
mod workflow;

pub use config::{
    site_root, Config, ConfigError, ConfigResult, ConnectionArgs, RunConfig, WorkflowConfig,
    DEFAULT_TARGET_STATUS, LOCAL_CONFIG_FILE,
};
pub use error::{WorkflowError, WorkflowResult};
pub use executor::{
    build_checkout, build_commit, CommandLine, CommandRunner, ExecutionError, ExecutionMode,
    ExecutionResult, Executor, StepOutcome,
};
pub use normalize::{
    classify, collapse_separators, slugify, trim_rules, Category, NamingRules,
    DEFAULT_MAX_SLUG_LENGTH, DEFAULT_NOISE_WORDS, SEPARATOR,
};
pub use reference::{IssueReference, ReferenceError, ReferenceResult};
pub use workflow::{
    pick_transition, BranchSpec, CommitSpec, TransitionOutcome, Workflow, WorkflowReport,
    WorkflowState, COMMIT_SEPARATOR,
};
