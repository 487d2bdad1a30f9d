//! Write-access checks for the acting user.

use cs_core::vcs::{VcsResult, VersionControl};
use tracing::debug;

/// True when `username` holds admin or write on `owner/repo`.
pub async fn has_repo_write(
    vcs: &dyn VersionControl,
    owner: &str,
    repo: &str,
    username: &str,
) -> VcsResult<bool> {
    let level = vcs
        .get_collaborator_permission(owner, repo, username)
        .await?;
    debug!(%owner, %repo, %username, %level, "collaborator permission");
    Ok(level.can_write())
}

/// True when `username` is a member of `org` and can write to `org/repo`.
pub async fn has_org_write(
    vcs: &dyn VersionControl,
    org: &str,
    repo: &str,
    username: &str,
) -> VcsResult<bool> {
    if !vcs.check_org_membership(org, username).await? {
        debug!(%org, %username, "not an organization member");
        return Ok(false);
    }
    has_repo_write(vcs, org, repo, username).await
}
