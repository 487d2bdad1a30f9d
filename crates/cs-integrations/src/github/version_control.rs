//! [`VersionControl`] and [`Notifier`] backed by the GitHub REST API.

use async_trait::async_trait;
use cs_core::event::EventContext;
use cs_core::notify::Notifier;
use cs_core::vcs::{
    ContentEnvelope, FileUpdate, NewPullRequest, PermissionLevel, PullRequestRef, VcsError,
    VcsResult, VersionControl,
};

use super::client::GitHubClient;
use super::{comments, contents, permissions, pull_requests};

#[async_trait]
impl VersionControl for GitHubClient {
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> VcsResult<Option<ContentEnvelope>> {
        Ok(contents::get_content(self, owner, repo, path, git_ref).await?)
    }

    async fn fetch_json(&self, url: &str) -> VcsResult<serde_json::Value> {
        Ok(contents::fetch_json(self, url).await?)
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> VcsResult<String> {
        Ok(contents::get_default_branch(self, owner, repo).await?)
    }

    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> VcsResult<String> {
        Ok(contents::get_branch_sha(self, owner, repo, branch).await?)
    }

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        from_sha: &str,
    ) -> VcsResult<()> {
        Ok(contents::create_branch(self, owner, repo, name, from_sha).await?)
    }

    async fn put_file_content(
        &self,
        owner: &str,
        repo: &str,
        update: &FileUpdate,
    ) -> VcsResult<()> {
        Ok(contents::put_file(self, owner, repo, update).await?)
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> VcsResult<PullRequestRef> {
        Ok(pull_requests::create_pull_request(self, owner, repo, pull).await?)
    }

    async fn get_collaborator_permission(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> VcsResult<PermissionLevel> {
        Ok(permissions::get_collaborator_permission(self, owner, repo, username).await?)
    }

    async fn check_org_membership(&self, org: &str, username: &str) -> VcsResult<bool> {
        Ok(permissions::check_org_membership(self, org, username).await?)
    }
}

#[async_trait]
impl Notifier for GitHubClient {
    async fn post_comment(&self, event: &EventContext, message: &str) -> VcsResult<()> {
        let number = event.thread_number().ok_or_else(|| {
            VcsError::Api("event carries no issue or pull request number".into())
        })?;
        comments::create_comment(self, event.repo_owner(), event.repo_name(), number, message)
            .await?;
        tracing::debug!(number, "posted comment");
        Ok(())
    }
}
