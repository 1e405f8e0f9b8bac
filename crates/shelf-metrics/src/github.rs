use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, trace, warn};
use ureq::{
    http::header::{ACCEPT, AUTHORIZATION},
    Agent,
};
use url::Url;

use crate::{
    error::{MetricsError, Result},
    http_client::ClientConfig,
    traits::MetricsSource,
    types::RawMetrics,
};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// An owner/repository pair taken from a source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Parses a repository URL such as `https://github.com/owner/repo`.
    ///
    /// The first two non-empty path segments name the owner and the repository;
    /// anything after them is ignored.
    pub fn parse(source_url: &str) -> Result<Self> {
        let invalid = || {
            MetricsError::InvalidSource {
                url: source_url.to_string(),
            }
        };

        let url = Url::parse(source_url.trim()).map_err(|_| invalid())?;
        let mut segments = url
            .path_segments()
            .ok_or_else(invalid)?
            .filter(|s| !s.is_empty());

        match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    stargazers_count: u64,
    forks_count: u64,
    watchers_count: u64,
    open_issues_count: u64,
    pushed_at: Option<String>,
}

impl TryFrom<GithubRepo> for RawMetrics {
    type Error = MetricsError;

    fn try_from(repo: GithubRepo) -> Result<Self> {
        let pushed_at = repo
            .pushed_at
            .ok_or_else(|| MetricsError::InvalidResponse("missing pushed_at".into()))?;
        let last_push = DateTime::parse_from_rfc3339(&pushed_at)
            .map_err(|e| MetricsError::InvalidResponse(format!("pushed_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Self {
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.watchers_count,
            open_issues: repo.open_issues_count,
            last_push,
        })
    }
}

/// Metrics fetcher backed by the GitHub REST API.
pub struct GithubClient {
    agent: Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    /// Creates a client for `api_url`.
    ///
    /// Without a `token` requests are sent unauthenticated and are subject to
    /// the provider's lower anonymous rate limit.
    pub fn new(api_url: &str, token: Option<String>, config: &ClientConfig) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        debug!(api_url = api_url, authenticated = token.is_some(), "creating GitHub client");

        Self {
            agent: config.build(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches the metrics of one repository, reporting why it failed.
    pub fn try_fetch(&self, repo: &RepoRef) -> Result<RawMetrics> {
        let url = format!("{}/repos/{}/{}", self.api_url, repo.owner, repo.repo);
        trace!(url = %url, authenticated = self.is_authenticated(), "requesting repository");

        let mut req = self.agent.get(&url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, &format!("Bearer {token}"));
        }

        let mut resp = req.call()?;
        let status = resp.status();

        if !status.is_success() {
            return Err(MetricsError::HttpError {
                status: status.as_u16(),
                url,
            });
        }

        let body: GithubRepo = resp
            .body_mut()
            .read_json()
            .map_err(|e| MetricsError::InvalidResponse(e.to_string()))?;

        RawMetrics::try_from(body)
    }
}

impl MetricsSource for GithubClient {
    fn fetch(&self, source_url: &str) -> Option<RawMetrics> {
        let repo = match RepoRef::parse(source_url) {
            Ok(repo) => repo,
            Err(err) => {
                warn!(source_url = source_url, "{err}");
                return None;
            }
        };

        match self.try_fetch(&repo) {
            Ok(metrics) => {
                debug!(
                    repo = %repo,
                    stars = metrics.stars,
                    forks = metrics.forks,
                    open_issues = metrics.open_issues,
                    "fetched repository metrics"
                );
                Some(metrics)
            }
            Err(err) => {
                warn!(repo = %repo, "failed to fetch metrics: {err}");
                None
            }
        }
    }
}
