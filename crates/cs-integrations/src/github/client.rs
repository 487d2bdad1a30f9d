use std::time::Duration;

use cs_core::vcs::VcsError;
use octocrab::Octocrab;
use thiserror::Error;

use crate::types::GitHubConfig;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("missing GitHub token")]
    MissingToken,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl GitHubError {
    /// True for a 404 answer from the API.
    pub fn is_not_found(&self) -> bool {
        match self {
            GitHubError::Api(octocrab::Error::GitHub { source, .. }) => {
                source.status_code.as_u16() == 404
            }
            _ => false,
        }
    }
}

impl From<GitHubError> for VcsError {
    fn from(err: GitHubError) -> Self {
        match err {
            e if e.is_not_found() => VcsError::NotFound(e.to_string()),
            GitHubError::Http(e) => VcsError::Http(e.to_string()),
            GitHubError::Serde(e) => VcsError::Decode(e.to_string()),
            GitHubError::Unexpected(msg) => VcsError::Decode(msg),
            other => VcsError::Api(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Authenticated GitHub API client shared by every repository the sync
/// touches.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    pub(crate) octocrab: Octocrab,
    pub(crate) http: reqwest::Client,
}

impl GitHubClient {
    /// Create a new `GitHubClient` from an explicit [`GitHubConfig`].
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let token = config
            .token
            .filter(|t| !t.is_empty())
            .ok_or(GitHubError::MissingToken)?;

        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(base) = config.api_base_url.as_deref() {
            builder = builder.base_uri(base)?;
        }
        let octocrab = builder.build()?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("confsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { octocrab, http })
    }
}
