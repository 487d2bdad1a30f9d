//! Version-control collaborator interface.
//!
//! Everything the sync pipeline needs from the code host goes through
//! [`VersionControl`]. Absence of a file is an expected outcome and is
//! reported as `Ok(None)`; only transport or protocol failures are errors.

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("version control API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type VcsResult<T> = std::result::Result<T, VcsError>;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// File response from the contents API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEnvelope {
    #[serde(default)]
    pub encoding: Option<String>,
    /// Base64 payload. GitHub wraps it at 60 columns.
    #[serde(default)]
    pub content: Option<String>,
    pub sha: String,
}

impl ContentEnvelope {
    /// Wrap raw text the way the contents API returns it.
    pub fn from_text(text: &str, sha: impl Into<String>) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            encoding: Some("base64".to_string()),
            content: Some(wrapped),
            sha: sha.into(),
        }
    }

    /// Decode the base64 payload to UTF-8 text.
    pub fn decode_text(&self) -> VcsResult<String> {
        let content = self
            .content
            .as_deref()
            .ok_or_else(|| VcsError::Decode("not a file content response".into()))?;

        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| VcsError::Decode(e.to_string()))?;

        String::from_utf8(bytes).map_err(|e| VcsError::Decode(e.to_string()))
    }
}

/// Repository permission of a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Admin,
    Maintain,
    Write,
    Triage,
    Read,
    None,
}

impl PermissionLevel {
    /// Parse the API's `permission` string; unknown values map to `None`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "admin" => PermissionLevel::Admin,
            "maintain" => PermissionLevel::Maintain,
            "write" => PermissionLevel::Write,
            "triage" => PermissionLevel::Triage,
            "read" => PermissionLevel::Read,
            _ => PermissionLevel::None,
        }
    }

    /// Admin or write access.
    pub fn can_write(self) -> bool {
        matches!(self, PermissionLevel::Admin | PermissionLevel::Write)
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionLevel::Admin => "admin",
            PermissionLevel::Maintain => "maintain",
            PermissionLevel::Write => "write",
            PermissionLevel::Triage => "triage",
            PermissionLevel::Read => "read",
            PermissionLevel::None => "none",
        };
        write!(f, "{s}")
    }
}

/// Update-in-place request for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub path: String,
    pub branch: String,
    pub message: String,
    /// Base64-encoded new content.
    pub content_base64: String,
    /// Blob sha of the file being replaced.
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub html_url: String,
}

// ---------------------------------------------------------------------------
// VersionControl trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Raw contents-API lookup. `Ok(None)` when the path does not exist.
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> VcsResult<Option<ContentEnvelope>>;

    /// GET an absolute URL and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> VcsResult<serde_json::Value>;

    async fn get_default_branch(&self, owner: &str, repo: &str) -> VcsResult<String>;

    /// Commit sha at the head of `branch`.
    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> VcsResult<String>;

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        from_sha: &str,
    ) -> VcsResult<()>;

    async fn put_file_content(&self, owner: &str, repo: &str, update: &FileUpdate)
        -> VcsResult<()>;

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> VcsResult<PullRequestRef>;

    async fn get_collaborator_permission(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> VcsResult<PermissionLevel>;

    async fn check_org_membership(&self, org: &str, username: &str) -> VcsResult<bool>;

    /// Decoded text of a file, `Ok(None)` when it does not exist.
    async fn get_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> VcsResult<Option<String>> {
        match self.get_content(owner, repo, path, git_ref).await? {
            Some(envelope) => envelope.decode_text().map(Some),
            None => Ok(None),
        }
    }

    /// Blob sha of an existing file on `branch`.
    async fn get_file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> VcsResult<String> {
        self.get_content(owner, repo, path, Some(branch))
            .await?
            .map(|envelope| envelope.sha)
            .ok_or_else(|| VcsError::NotFound(format!("{owner}/{repo}/{path}@{branch}")))
    }
}
