//! Repository contents, branches and commits.

use cs_core::vcs::{ContentEnvelope, FileUpdate};
use serde_json::json;

use crate::types::GitRef;

use super::client::{GitHubClient, GitHubError, Result};

/// Fetch the contents-API envelope for `path`. `Ok(None)` on 404.
pub async fn get_content(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    path: &str,
    git_ref: Option<&str>,
) -> Result<Option<ContentEnvelope>> {
    let route = format!("/repos/{owner}/{repo}/contents/{}", path.trim_start_matches('/'));
    let query = git_ref.map(|r| vec![("ref", r)]);

    let response: std::result::Result<serde_json::Value, octocrab::Error> =
        client.octocrab.get(route, query.as_deref()).await;

    let value = match response.map_err(GitHubError::from) {
        Ok(value) => value,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };

    // Directories come back as an array of entries.
    if !value.is_object() {
        return Err(GitHubError::Unexpected(format!(
            "{owner}/{repo}/{path} is not a file"
        )));
    }
    let envelope: ContentEnvelope = serde_json::from_value(value)?;
    Ok(Some(envelope))
}

pub async fn get_default_branch(client: &GitHubClient, owner: &str, repo: &str) -> Result<String> {
    let repository = client.octocrab.repos(owner, repo).get().await?;
    repository
        .default_branch
        .ok_or_else(|| GitHubError::Unexpected(format!("{owner}/{repo} has no default branch")))
}

/// Head commit sha of `branch`.
pub async fn get_branch_sha(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    branch: &str,
) -> Result<String> {
    let route = format!("/repos/{owner}/{repo}/git/ref/heads/{branch}");
    let git_ref: GitRef = client.octocrab.get(route, None::<&()>).await?;
    Ok(git_ref.object.sha)
}

pub async fn create_branch(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    name: &str,
    from_sha: &str,
) -> Result<()> {
    let route = format!("/repos/{owner}/{repo}/git/refs");
    let body = json!({
        "ref": format!("refs/heads/{name}"),
        "sha": from_sha,
    });
    let _: serde_json::Value = client.octocrab.post(route, Some(&body)).await?;
    Ok(())
}

/// Replace an existing file on `update.branch`.
pub async fn put_file(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    update: &FileUpdate,
) -> Result<()> {
    let route = format!(
        "/repos/{owner}/{repo}/contents/{}",
        update.path.trim_start_matches('/')
    );
    let body = json!({
        "message": update.message,
        "content": update.content_base64,
        "sha": update.sha,
        "branch": update.branch,
    });
    let _: serde_json::Value = client.octocrab.put(route, Some(&body)).await?;
    Ok(())
}

/// GET an absolute URL outside the API (plugin manifests) as JSON.
pub async fn fetch_json(client: &GitHubClient, url: &str) -> Result<serde_json::Value> {
    let value = client
        .http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(value)
}
