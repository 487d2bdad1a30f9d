use serde::{Deserialize, Serialize};

/// Connection settings for [`crate::github::client::GitHubClient`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub token: Option<String>,
    /// API root override (GitHub Enterprise, test servers).
    #[serde(default)]
    pub api_base_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}/git/ref/heads/{branch}` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GitObject {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/collaborators/{user}/permission` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CollaboratorPermission {
    pub permission: String,
}
