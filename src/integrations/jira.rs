//! Jira integration.
//!
//! Talks to the Jira REST API (v2) with basic authentication: an account
//! e-mail and an API token created on https://id.atlassian.com/manage/api-tokens.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{Issue, IssueTracker, TrackerError, TrackerResult, Transition};
use crate::core::IssueReference;

/// Request timeout for every Jira call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields requested when fetching an issue.
const ISSUE_FIELDS: &str = "summary,issuetype";

/// Username and API token for basic authentication.
#[derive(Clone)]
pub struct JiraCredentials {
    /// Jira username, usually an e-mail address
    pub username: String,
    /// API token
    pub token: String,
}

impl std::fmt::Debug for JiraCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraCredentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Jira REST API client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    /// Site root, e.g. "https://mycompany.atlassian.net"
    root: String,
    /// Credentials for basic auth
    credentials: JiraCredentials,
    /// HTTP client
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    id: String,
    key: String,
    #[serde(rename = "self")]
    self_link: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    issuetype: Option<IssueTypeField>,
}

#[derive(Debug, Deserialize)]
struct IssueTypeField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<TransitionEntry>,
}

#[derive(Debug, Deserialize)]
struct TransitionEntry {
    id: String,
    name: String,
    to: Option<StatusField>,
}

#[derive(Debug, Deserialize)]
struct StatusField {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

impl From<IssueResponse> for Issue {
    fn from(response: IssueResponse) -> Self {
        Self {
            id: response.id,
            key: response.key,
            title: response.fields.summary,
            type_name: response.fields.issuetype.map(|t| t.name).unwrap_or_default(),
            self_link: response.self_link,
        }
    }
}

impl From<TransitionEntry> for Transition {
    fn from(entry: TransitionEntry) -> Self {
        Self { id: entry.id, name: entry.name, to: entry.to.map(|s| s.name) }
    }
}

impl ErrorResponse {
    /// First human-readable message Jira gave us, if any.
    fn first_message(&self) -> Option<String> {
        self.error_messages.first().cloned().or_else(|| {
            self.errors.iter().next().map(|(field, value)| match value.as_str() {
                Some(text) => format!("{field}: {text}"),
                None => format!("{field}: {value}"),
            })
        })
    }
}

impl JiraClient {
    /// Create a new Jira client for the site at `root`.
    pub fn new(root: impl Into<String>, credentials: JiraCredentials) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("git-jira/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { root: root.into().trim_end_matches('/').to_string(), credentials, client })
    }

    /// Site root this client talks to.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Build a REST API URL.
    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.root, path)
    }

    /// URL of an issue resource. The key is encoded as a single path segment.
    fn issue_url(&self, reference: &IssueReference, suffix: &str) -> String {
        self.api_url(&format!("issue/{}{}", urlencoding::encode(reference.as_str()), suffix))
    }

    /// Make an authenticated request.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .header("Accept", "application/json")
    }

    /// Turn a non-success response into an error.
    async fn parse_error(response: reqwest::Response, reference: &IssueReference) -> TrackerError {
        let status = response.status().as_u16();

        match status {
            401 => TrackerError::Unauthorized,
            404 => TrackerError::NotFound(format!("Issue {} not found", reference)),
            429 => TrackerError::RateLimited,
            _ => {
                let message = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.first_message())
                    .unwrap_or_else(|| format!("HTTP {}", status));
                TrackerError::Api { status, message }
            }
        }
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_issue(&self, reference: &IssueReference) -> TrackerResult<Issue> {
        let url = self.issue_url(reference, "");
        tracing::debug!(%url, "Fetching issue");

        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("fields", ISSUE_FIELDS)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response, reference).await);
        }

        let issue: IssueResponse = response.json().await?;
        Ok(issue.into())
    }

    async fn list_transitions(&self, reference: &IssueReference) -> TrackerResult<Vec<Transition>> {
        let url = self.issue_url(reference, "/transitions");
        tracing::debug!(%url, "Listing transitions");

        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response, reference).await);
        }

        let body: TransitionsResponse = response.json().await?;
        Ok(body.transitions.into_iter().map(Transition::from).collect())
    }

    async fn apply_transition(
        &self,
        reference: &IssueReference,
        transition_id: &str,
    ) -> TrackerResult<()> {
        let url = self.issue_url(reference, "/transitions");
        tracing::debug!(%url, transition_id, "Applying transition");

        let body = serde_json::json!({ "transition": { "id": transition_id } });
        let response = self.request(reqwest::Method::POST, &url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response, reference).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> JiraCredentials {
        JiraCredentials { username: "dev@example.com".to_string(), token: "secret".to_string() }
    }

    #[test]
    fn test_api_url() {
        let client = JiraClient::new("https://example.atlassian.net/", credentials()).unwrap();
        assert_eq!(client.root(), "https://example.atlassian.net");
        assert_eq!(
            client.api_url("issue/ABC-1/transitions"),
            "https://example.atlassian.net/rest/api/2/issue/ABC-1/transitions"
        );
    }

    #[test]
    fn test_issue_url() {
        let client = JiraClient::new("https://example.atlassian.net", credentials()).unwrap();
        let reference = IssueReference::parse("ABC-1").unwrap();
        assert_eq!(
            client.issue_url(&reference, ""),
            "https://example.atlassian.net/rest/api/2/issue/ABC-1"
        );
        assert_eq!(
            client.issue_url(&reference, "/transitions"),
            "https://example.atlassian.net/rest/api/2/issue/ABC-1/transitions"
        );
    }

    #[test]
    fn test_issue_url_keeps_reserved_characters_in_the_path() {
        let client = JiraClient::new("https://example.atlassian.net", credentials()).unwrap();

        let reference = IssueReference::parse("ABC-1?expand=x-2").unwrap();
        let url = reqwest::Url::parse(&client.issue_url(&reference, "/transitions")).unwrap();
        assert_eq!(url.path(), "/rest/api/2/issue/ABC-1%3Fexpand%3Dx-2/transitions");
        assert!(url.query().is_none());

        let reference = IssueReference::parse("ABC-1#x-2").unwrap();
        let url = reqwest::Url::parse(&client.issue_url(&reference, "/transitions")).unwrap();
        assert_eq!(url.path(), "/rest/api/2/issue/ABC-1%23x-2/transitions");
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let output = format!("{:?}", credentials());
        assert!(output.contains("dev@example.com"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_issue_response_conversion() {
        let json = r#"{
            "id": "10001",
            "key": "ABC-1",
            "self": "https://example.atlassian.net/rest/api/2/issue/10001",
            "fields": {
                "summary": "Android | Home Screen",
                "issuetype": { "id": "10004", "name": "Story", "subtask": false }
            }
        }"#;

        let response: IssueResponse = serde_json::from_str(json).unwrap();
        let issue = Issue::from(response);

        assert_eq!(issue.id, "10001");
        assert_eq!(issue.key, "ABC-1");
        assert_eq!(issue.title, "Android | Home Screen");
        assert_eq!(issue.type_name, "Story");
        assert_eq!(issue.self_link, "https://example.atlassian.net/rest/api/2/issue/10001");
    }

    #[test]
    fn test_issue_response_without_type() {
        let json = r#"{"id": "1", "key": "ABC-2", "self": "x", "fields": {"summary": "Title"}}"#;
        let issue = Issue::from(serde_json::from_str::<IssueResponse>(json).unwrap());
        assert_eq!(issue.type_name, "");
    }

    #[test]
    fn test_transitions_response_conversion() {
        let json = r#"{
            "expand": "transitions",
            "transitions": [
                { "id": "11", "name": "To Do", "to": { "id": "1", "name": "To Do" } },
                {
                    "id": "21",
                    "name": "Start Progress",
                    "to": { "id": "3", "name": "In Progress" }
                },
                { "id": "31", "name": "Done" }
            ]
        }"#;

        let body: TransitionsResponse = serde_json::from_str(json).unwrap();
        let transitions: Vec<Transition> =
            body.transitions.into_iter().map(Transition::from).collect();

        assert_eq!(transitions.len(), 3);
        assert_eq!(transitions[1].id, "21");
        assert_eq!(transitions[1].to.as_deref(), Some("In Progress"));
        assert!(transitions[2].to.is_none());
    }

    #[test]
    fn test_error_response_message() {
        let json = r#"{
            "errorMessages": ["Issue does not exist or you do not have permission to see it."],
            "errors": {}
        }"#;
        let body: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            body.first_message().as_deref(),
            Some("Issue does not exist or you do not have permission to see it.")
        );

        let json = r#"{"errorMessages": [], "errors": {"transition": "Invalid transition"}}"#;
        let body: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.first_message().as_deref(), Some("transition: Invalid transition"));

        assert!(ErrorResponse::default().first_message().is_none());
    }
}
