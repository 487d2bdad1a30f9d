//! Publish an edited file as a pull request on a fresh branch.

use base64::Engine;
use chrono::{DateTime, Utc};
use cs_core::target::Target;
use cs_core::vcs::{FileUpdate, NewPullRequest, VcsResult, VersionControl};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Who asked for the change and where.
#[derive(Debug, Clone, Copy)]
pub struct Attribution<'a> {
    pub sender: &'a str,
    pub comment_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub pull_request_url: String,
    pub pull_request_number: u64,
    pub branch: String,
}

pub fn branch_name(now: DateTime<Utc>) -> String {
    format!("update-config-{}", now.timestamp_millis())
}

pub fn commit_message(file_path: &str) -> String {
    format!("Update {file_path}")
}

pub fn pull_request_title(file_path: &str) -> String {
    format!("chore: update `{file_path}`")
}

pub fn pull_request_body(instruction: &str, attribution: &Attribution<'_>) -> String {
    format!(
        "> {instruction}.\n\n _Originally posted by @{} in {}_",
        attribution.sender, attribution.comment_url
    )
}

/// Branch off the default branch, commit `content` to the target file and
/// open a pull request back into the default branch.
pub async fn apply_change(
    vcs: &dyn VersionControl,
    target: &Target,
    content: &str,
    message: &str,
    instruction: &str,
    attribution: &Attribution<'_>,
) -> VcsResult<AppliedChange> {
    let (owner, repo) = (target.owner.as_str(), target.repo.as_str());

    let base = vcs.get_default_branch(owner, repo).await?;
    let base_sha = vcs.get_branch_sha(owner, repo, &base).await?;
    let branch = branch_name(Utc::now());
    vcs.create_branch(owner, repo, &branch, &base_sha).await?;

    let file_sha = vcs
        .get_file_sha(owner, repo, &target.file_path, &branch)
        .await?;
    vcs.put_file_content(
        owner,
        repo,
        &FileUpdate {
            path: target.file_path.clone(),
            branch: branch.clone(),
            message: message.to_string(),
            content_base64: base64::engine::general_purpose::STANDARD.encode(content),
            sha: file_sha,
        },
    )
    .await?;

    let pull = vcs
        .create_pull_request(
            owner,
            repo,
            &NewPullRequest {
                title: pull_request_title(&target.file_path),
                body: pull_request_body(instruction, attribution),
                head: branch.clone(),
                base,
            },
        )
        .await?;

    info!(target = %target.id(), url = %pull.html_url, "opened pull request");
    Ok(AppliedChange {
        pull_request_url: pull.html_url,
        pull_request_number: pull.number,
        branch,
    })
}
