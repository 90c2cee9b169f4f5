//! Configuration management for git-jira.
//!
//! Two layers: an optional TOML file with workflow and naming preferences, and
//! the per-run [`RunConfig`] that merges it with the credentials and flags
//! resolved by the CLI. The run configuration is built once and only read
//! afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::executor::ExecutionMode;
use super::normalize::NamingRules;
use super::reference::IssueReference;
use crate::integrations::JiraCredentials;

/// Name of the per-repository config file.
pub const LOCAL_CONFIG_FILE: &str = ".git-jira.toml";

/// Status the workflow moves a ticket to when no override is configured.
pub const DEFAULT_TARGET_STATUS: &str = "In Progress";

/// File-based configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workflow settings
    pub workflow: WorkflowConfig,

    /// Branch naming settings
    pub branch: NamingRules,
}

/// Workflow settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Statuses to move the issue to, in order of preference
    pub target_statuses: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { target_statuses: vec![DEFAULT_TARGET_STATUS.to_string()] }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// Checks in order:
    /// 1. `.git-jira.toml` in current directory
    /// 2. `~/.config/git-jira/config.toml`
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e)
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Get the global config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("git-jira"))
    }
}

/// Result type for configuration resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error types for configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {setting}: pass {flag} or set {env}")]
    Missing { setting: &'static str, flag: &'static str, env: &'static str },
}

/// Settings as given on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Jira username
    pub username: Option<String>,
    /// Jira API token
    pub token: Option<String>,
    /// Jira host, e.g. "mycompany.atlassian.net"
    pub base_url: Option<String>,
}

/// Immutable configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Credentials for the tracker
    pub credentials: JiraCredentials,

    /// Site root including the scheme, without a trailing slash
    pub site_root: String,

    /// Live or dry run
    pub mode: ExecutionMode,

    /// Statuses to move the issue to, in order of preference
    pub target_statuses: Vec<String>,

    /// Branch naming rules
    pub naming: NamingRules,
}

impl RunConfig {
    /// Merge CLI/environment settings with the file configuration.
    ///
    /// Blank values count as missing.
    pub fn resolve(args: ConnectionArgs, mode: ExecutionMode, file: Config) -> ConfigResult<Self> {
        let username = required(args.username, "username", "--username", "JIRA_USERNAME")?;
        let token = required(args.token, "API token", "--token", "JIRA_API_TOKEN")?;
        let base_url = required(args.base_url, "base URL", "--base-url", "JIRA_BASE_URL")?;

        Ok(Self {
            credentials: JiraCredentials { username, token },
            site_root: site_root(&base_url),
            mode,
            target_statuses: file.workflow.target_statuses,
            naming: file.branch,
        })
    }

    /// Browser URL of an issue.
    pub fn browse_url(&self, reference: &IssueReference) -> String {
        format!("{}/browse/{}", self.site_root, reference)
    }
}

fn required(
    value: Option<String>,
    setting: &'static str,
    flag: &'static str,
    env: &'static str,
) -> ConfigResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing { setting, flag, env })
}

/// Turn a base URL into a site root.
///
/// A bare host gets `https://`; an explicit scheme is kept.
pub fn site_root(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
