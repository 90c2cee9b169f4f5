//! Command execution module.
//!
//! Builds the git command lines the workflow needs and runs them, or only
//! logs them when running in dry-run mode.

use std::fmt;
use std::process::{Command as ProcessCommand, Stdio};
use std::time::Instant;

/// Whether side-effecting steps actually run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Run commands and change tracker state
    #[default]
    Live,
    /// Only log what would happen
    DryRun,
}

impl ExecutionMode {
    /// Pick the mode from a `--dry-run` flag.
    pub const fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Live
        }
    }

    /// Check if this is a dry run.
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// A program and its arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    /// Create a command line from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![program.into()];
        argv.extend(args.into_iter().map(Into::into));
        Self(argv)
    }

    /// The program to run.
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> &[String] {
        &self.0
    }

    /// Consume into the argument vector.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for CommandLine {
    /// Shell-like rendering for logs: arguments with whitespace or quotes are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|arg| {
                if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
                    format!("{:?}", arg)
                } else {
                    arg.clone()
                }
            })
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

/// `git checkout -b <branch>`
pub fn build_checkout(branch: &str) -> CommandLine {
    CommandLine::new("git", ["checkout", "-b", branch])
}

/// `git commit --allow-empty -m <line> ...`, one `-m` per message line.
pub fn build_commit<S: AsRef<str>>(lines: &[S]) -> CommandLine {
    let mut args = vec!["commit".to_string(), "--allow-empty".to_string()];
    for line in lines {
        args.push("-m".to_string());
        args.push(line.as_ref().to_string());
    }
    CommandLine::new("git", args)
}

/// What happened to a step handed to a [`CommandRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The process ran and exited successfully
    Executed,
    /// Dry run: the command was logged, nothing ran
    Simulated,
}

/// Result type for command execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Error types for command execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", describe_exit(.code))]
    NonZeroExit { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code (terminated by signal)".to_string(), |c| format!("code {c}"))
}

/// Runs (or simulates) external commands.
///
/// The mode is passed on every call so a run has a single source for it.
pub trait CommandRunner {
    /// Run one command to completion, or only log it in [`ExecutionMode::DryRun`].
    fn execute(&self, command: &CommandLine, mode: ExecutionMode) -> ExecutionResult<StepOutcome>;
}

/// Dry-run aware process executor.
///
/// In live mode commands inherit stdin/stdout/stderr so git's own output
/// reaches the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Executor;

impl Executor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for Executor {
    fn execute(&self, command: &CommandLine, mode: ExecutionMode) -> ExecutionResult<StepOutcome> {
        if mode.is_dry_run() {
            tracing::info!(command = %command, "[DRY RUN] Would execute");
            return Ok(StepOutcome::Simulated);
        }

        tracing::debug!(command = %command, "Executing");
        let start = Instant::now();

        let status = ProcessCommand::new(command.program())
            .args(command.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ExecutionError::Spawn { command: command.to_string(), source })?;

        tracing::debug!(
            command = %command,
            code = ?status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Command finished"
        );

        if !status.success() {
            return Err(ExecutionError::NonZeroExit {
                command: command.to_string(),
                code: status.code(),
            });
        }

        Ok(StepOutcome::Executed)
    }
}
