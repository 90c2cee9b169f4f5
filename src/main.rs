//! git-jira - start work on a Jira issue.
//!
//! Creates a branch named after the issue, makes an initial commit that links
//! to it and moves the issue to "In Progress".

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use git_jira::core::{
    Config, ConnectionArgs, ExecutionMode, Executor, RunConfig, TransitionOutcome, Workflow,
    WorkflowError,
};
use git_jira::integrations::JiraClient;

/// Perform jira operations for a git repo
#[derive(Parser)]
#[command(name = "git-jira")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "git jira <ISSUE> [OPTIONS]")]
struct Cli {
    /// Issue key (ABC-123) or a URL/path ending in one
    issue: String,

    /// Your Jira username, usually your email
    #[arg(short, long, env = "JIRA_USERNAME")]
    username: Option<String>,

    /// API token created on https://id.atlassian.com/manage/api-tokens
    #[arg(short, long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Jira host, e.g. mycompany.atlassian.net
    #[arg(short, long, env = "JIRA_BASE_URL")]
    base_url: Option<String>,

    /// Dry run - log the git commands and the status change without running them
    #[arg(short, long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to .git-jira.toml, then ~/.config/git-jira/config.toml)
    #[arg(long, env = "GIT_JIRA_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    // JIRA_* variables may live in a .env file next to the repository.
    // Loaded before parsing so clap sees them; reported once logging is up.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "Failed to load .env file, continuing without it"),
    }

    let issue = cli.issue.clone();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&issue, &err);
            ExitCode::FAILURE
        }
    }
}

/// Resolve configuration and run the workflow.
fn run(cli: Cli) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    let args = ConnectionArgs { username: cli.username, token: cli.token, base_url: cli.base_url };
    let config = RunConfig::resolve(args, ExecutionMode::from_dry_run(cli.dry_run), file_config)?;

    let tracker = JiraClient::new(config.site_root.clone(), config.credentials.clone())?;
    let executor = Executor::new();

    // Create tokio runtime for the tracker calls
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(Workflow::new(&tracker, &executor, &config).run(&cli.issue))?;

    let status = match &report.transition {
        TransitionOutcome::Applied { status, .. } => format!("moved to '{status}'"),
        TransitionOutcome::Simulated { status, .. } => format!("would move to '{status}'"),
        TransitionOutcome::NotAvailable => "status unchanged".to_string(),
    };

    tracing::info!(
        issue = %report.reference,
        branch = %report.branch,
        dry_run = config.mode.is_dry_run(),
        "Started work on {}: {}",
        report.reference,
        status
    );

    Ok(())
}

/// Log the single diagnostic for a failed run.
///
/// `raw_issue` is the argument as given; the parsed key replaces it once the
/// reference is valid.
fn report_failure(raw_issue: &str, err: &anyhow::Error) {
    match err.downcast_ref::<WorkflowError>() {
        Some(workflow_err) => {
            let issue = workflow_err
                .reference()
                .map_or_else(|| raw_issue.to_string(), ToString::to_string);
            tracing::error!(issue = %issue, kind = workflow_err.kind(), "{}", workflow_err);
        }
        None => tracing::error!(issue = %raw_issue, kind = "setup", "{:#}", err),
    }
}
