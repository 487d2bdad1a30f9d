use cs_core::vcs::PermissionLevel;

use crate::types::CollaboratorPermission;

use super::client::{GitHubClient, Result};

/// Permission of `username` on `owner/repo`.
pub async fn get_collaborator_permission(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    username: &str,
) -> Result<PermissionLevel> {
    let route = format!("/repos/{owner}/{repo}/collaborators/{username}/permission");
    let response: CollaboratorPermission = client.octocrab.get(route, None::<&()>).await?;
    Ok(PermissionLevel::parse(&response.permission))
}

pub async fn check_org_membership(client: &GitHubClient, org: &str, username: &str) -> Result<bool> {
    let is_member = client.octocrab.orgs(org).check_membership(username).await?;
    Ok(is_member)
}
