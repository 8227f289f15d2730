use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::remote::RemoteIdentity;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github+json";
const BODY_SNIPPET_CHARS: usize = 160;

/// How far a branch has moved relative to an installed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareOutcome {
    /// Commits on the branch that the installed commit does not have.
    pub ahead_by: u64,
    /// Commits in the installed commit that the branch does not have.
    pub behind_by: u64,
    /// First line of each listed commit message, in API order, followed by an
    /// "N more omitted" marker when the server truncated the list.
    pub ahead_by_commits: Vec<String>,
}

impl CompareOutcome {
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.ahead_by == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("commit {commit} not found on the remote")]
    NotFound { commit: String, body: String },
    #[error("{detail}")]
    Unexpected { detail: String },
}

impl CompareError {
    fn unexpected(detail: impl Into<String>) -> Self {
        Self::Unexpected {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("failed to read trusted certificate {}: {source}", .path.display())]
    ReadCertificate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trusted certificate {}: {reason}", .path.display())]
    InvalidCertificate { path: PathBuf, reason: String },
    #[error("invalid API base URL {api_base:?}: {reason}")]
    InvalidApiBase { api_base: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    /// Extra root certificate (PEM) trusted in addition to the built-in roots.
    pub ca_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ca_file: None,
            timeout: None,
            user_agent: concat!("branchwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CompareResponse {
    ahead_by: u64,
    behind_by: u64,
    total_commits: u64,
    commits: Vec<CompareCommit>,
}

#[derive(Deserialize)]
struct CompareCommit {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

/// Client for the hosting API's "compare two commits" endpoint.
#[derive(Debug, Clone)]
pub struct CompareClient {
    client: reqwest::Client,
    api_base: Url,
}

impl CompareClient {
    /// Build the HTTP client.
    ///
    /// # Errors
    /// Returns an error when the API base is not an absolute URL, the trusted
    /// certificate cannot be read or holds no PEM certificate, or the TLS
    /// backend cannot be initialised.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientBuildError> {
        let api_base = parse_api_base(&config.api_base)?;
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(path) = &config.ca_file {
            let pem = std::fs::read(path).map_err(|source| ClientBuildError::ReadCertificate {
                path: path.clone(),
                source,
            })?;
            let invalid = |reason: String| ClientBuildError::InvalidCertificate {
                path: path.clone(),
                reason,
            };
            let certificates = reqwest::Certificate::from_pem_bundle(&pem)
                .map_err(|error| invalid(error.to_string()))?;
            if certificates.is_empty() {
                return Err(invalid("no PEM certificate found".to_string()));
            }

            debug!(
                "Trusting {} extra root certificate(s) from {}",
                certificates.len(),
                path.display()
            );
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder.build().map_err(ClientBuildError::Build)?;

        Ok(Self { client, api_base })
    }

    /// Endpoint comparing `base_commit` with `remote.branch`. Every component
    /// is percent-encoded as a single path segment.
    #[must_use]
    pub fn compare_url(&self, remote: &RemoteIdentity, base_commit: &str) -> Url {
        let mut url = self.api_base.clone();
        let basehead = format!("{base_commit}...{}", remote.branch);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "repos",
                remote.owner.as_str(),
                remote.repo.as_str(),
                "compare",
                basehead.as_str(),
            ]);
        }
        url
    }

    /// Compare `base_commit` against the tip of `remote.branch`.
    ///
    /// # Errors
    /// Returns [`CompareError::NotFound`] when the remote does not know the
    /// commit and [`CompareError::Unexpected`] for any other status, transport
    /// failure or unparseable body.
    pub async fn compare(
        &self,
        remote: &RemoteIdentity,
        base_commit: &str,
    ) -> Result<CompareOutcome, CompareError> {
        let url = self.compare_url(remote, base_commit);
        debug!("Requesting {url}");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|error| CompareError::unexpected(format!("request to {url} failed: {error}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            CompareError::unexpected(format!("failed to read response from {url}: {error}"))
        })?;

        match status {
            StatusCode::OK => {
                let outcome = parse_compare_response(&body)?;
                info!(
                    "{remote} is {} commit(s) ahead of {base_commit}",
                    outcome.ahead_by
                );
                Ok(outcome)
            }
            StatusCode::NOT_FOUND => Err(CompareError::NotFound {
                commit: base_commit.to_string(),
                body,
            }),
            status => Err(CompareError::unexpected(format!(
                "{url} returned HTTP {status}{}",
                response_snippet(&body, BODY_SNIPPET_CHARS)
            ))),
        }
    }
}

/// Translate a successful comparison body into a [`CompareOutcome`].
///
/// # Errors
/// Returns [`CompareError::Unexpected`] when the body is not the expected JSON.
pub fn parse_compare_response(body: &str) -> Result<CompareOutcome, CompareError> {
    let response: CompareResponse = serde_json::from_str(body).map_err(|error| {
        CompareError::unexpected(format!("failed to parse comparison response: {error}"))
    })?;

    let listed = u64::try_from(response.commits.len()).unwrap_or(u64::MAX);
    let mut ahead_by_commits: Vec<String> = response
        .commits
        .iter()
        .map(|entry| first_line(&entry.commit.message).to_string())
        .collect();

    if listed < response.total_commits {
        ahead_by_commits.push(format!(
            "... {} more omitted",
            response.total_commits - listed
        ));
    }

    Ok(CompareOutcome {
        ahead_by: response.ahead_by,
        behind_by: response.behind_by,
        ahead_by_commits,
    })
}

fn parse_api_base(api_base: &str) -> Result<Url, ClientBuildError> {
    let invalid = |reason: String| ClientBuildError::InvalidApiBase {
        api_base: api_base.to_string(),
        reason,
    };
    let url = Url::parse(api_base).map_err(|error| invalid(error.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }
    Ok(url)
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
