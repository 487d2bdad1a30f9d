use super::client::{GitHubClient, Result};

/// Post a comment on an issue or pull request thread.
pub async fn create_comment(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    number: u64,
    body: &str,
) -> Result<()> {
    client
        .octocrab
        .issues(owner, repo)
        .create_comment(number, body)
        .await?;
    Ok(())
}
