use cs_core::vcs::{NewPullRequest, PullRequestRef};

use super::client::{GitHubClient, Result};

/// Open a pull request from `pull.head` into `pull.base`.
pub async fn create_pull_request(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    pull: &NewPullRequest,
) -> Result<PullRequestRef> {
    let pr = client
        .octocrab
        .pulls(owner, repo)
        .create(&pull.title, &pull.head, &pull.base)
        .body(&pull.body)
        .send()
        .await?;

    Ok(PullRequestRef {
        number: pr.number,
        html_url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
    })
}
