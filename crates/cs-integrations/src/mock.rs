//! In-memory [`VersionControl`] + [`Notifier`] for tests.
//!
//! Repositories are plain maps keyed by `(owner, repo, path)`. Every trait
//! call is appended to a call log so tests can assert on lookup order and
//! counts, and every write (branch, file, pull request, comment) is recorded.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use cs_core::event::EventContext;
use cs_core::notify::Notifier;
use cs_core::vcs::{
    ContentEnvelope, FileUpdate, NewPullRequest, PermissionLevel, PullRequestRef, VcsError,
    VcsResult, VersionControl,
};

/// A recorded `create_branch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBranch {
    pub owner: String,
    pub repo: String,
    pub name: String,
    pub from_sha: String,
}

/// A recorded `put_file_content` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub owner: String,
    pub repo: String,
    pub update: FileUpdate,
}

/// A recorded `create_pull_request` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedPullRequest {
    pub owner: String,
    pub repo: String,
    pub pull: NewPullRequest,
    pub html_url: String,
}

/// A recorded `post_comment` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub owner: String,
    pub repo: String,
    pub number: Option<u64>,
    pub body: String,
}

#[derive(Debug, Default)]
struct State {
    files: HashMap<(String, String, String), String>,
    default_branches: HashMap<(String, String), String>,
    permissions: HashMap<(String, String, String), PermissionLevel>,
    org_members: HashSet<(String, String)>,
    json: HashMap<String, serde_json::Value>,
    failing: HashSet<String>,
    calls: Vec<String>,
    branches: Vec<CreatedBranch>,
    writes: Vec<WrittenFile>,
    pulls: Vec<OpenedPullRequest>,
    comments: Vec<PostedComment>,
}

#[derive(Debug, Default)]
pub struct MockVersionControl {
    state: Mutex<State>,
}

fn repo_key(owner: &str, repo: &str) -> (String, String) {
    (owner.to_string(), repo.to_string())
}

/// Deterministic fake blob sha for file content.
fn fake_sha(text: &str) -> String {
    let sum = text
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    format!("{sum:016x}")
}

impl MockVersionControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- seeding -------------------------------------------------------------

    pub fn with_file(self, owner: &str, repo: &str, path: &str, content: &str) -> Self {
        self.state().files.insert(
            (owner.to_string(), repo.to_string(), path.to_string()),
            content.to_string(),
        );
        self
    }

    pub fn with_default_branch(self, owner: &str, repo: &str, branch: &str) -> Self {
        self.state()
            .default_branches
            .insert(repo_key(owner, repo), branch.to_string());
        self
    }

    pub fn with_permission(
        self,
        owner: &str,
        repo: &str,
        username: &str,
        level: PermissionLevel,
    ) -> Self {
        self.state().permissions.insert(
            (owner.to_string(), repo.to_string(), username.to_string()),
            level,
        );
        self
    }

    pub fn with_org_member(self, org: &str, username: &str) -> Self {
        self.state()
            .org_members
            .insert((org.to_string(), username.to_string()));
        self
    }

    /// Serve `value` for `fetch_json(url)`.
    pub fn with_json(self, url: &str, value: serde_json::Value) -> Self {
        self.state().json.insert(url.to_string(), value);
        self
    }

    /// Make every call whose log entry starts with `prefix` fail with an API error.
    pub fn failing(self, prefix: &str) -> Self {
        self.state().failing.insert(prefix.to_string());
        self
    }

    // -- inspection ----------------------------------------------------------

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of logged calls starting with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn branches(&self) -> Vec<CreatedBranch> {
        self.state().branches.clone()
    }

    pub fn writes(&self) -> Vec<WrittenFile> {
        self.state().writes.clone()
    }

    pub fn pull_requests(&self) -> Vec<OpenedPullRequest> {
        self.state().pulls.clone()
    }

    pub fn comments(&self) -> Vec<PostedComment> {
        self.state().comments.clone()
    }

    /// Current text of a file, as written on `branch` when given.
    pub fn file(&self, owner: &str, repo: &str, path: &str, branch: Option<&str>) -> Option<String> {
        let key = match branch {
            Some(branch) => Self::branch_file_key(owner, repo, path, branch),
            None => (owner.to_string(), repo.to_string(), path.to_string()),
        };
        self.state().files.get(&key).cloned()
    }

    fn record(&self, call: String) -> VcsResult<()> {
        let mut state = self.state();
        let fails = state.failing.iter().any(|p| call.starts_with(p.as_str()));
        state.calls.push(call.clone());
        if fails {
            return Err(VcsError::Api(format!("injected failure: {call}")));
        }
        Ok(())
    }

    fn branch_file_key(owner: &str, repo: &str, path: &str, branch: &str) -> (String, String, String) {
        (
            owner.to_string(),
            repo.to_string(),
            format!("{path}@{branch}"),
        )
    }
}

#[async_trait]
impl VersionControl for MockVersionControl {
    async fn get_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> VcsResult<Option<ContentEnvelope>> {
        self.record(format!(
            "get_content {owner}/{repo}/{path}@{}",
            git_ref.unwrap_or("")
        ))?;
        let state = self.state();
        // A write on a branch shadows the base file on that branch.
        let on_branch = git_ref
            .and_then(|r| state.files.get(&Self::branch_file_key(owner, repo, path, r)));
        let text = on_branch.or_else(|| {
            state
                .files
                .get(&(owner.to_string(), repo.to_string(), path.to_string()))
        });
        Ok(text.map(|t| ContentEnvelope::from_text(t, fake_sha(t))))
    }

    async fn fetch_json(&self, url: &str) -> VcsResult<serde_json::Value> {
        self.record(format!("fetch_json {url}"))?;
        self.state()
            .json
            .get(url)
            .cloned()
            .ok_or_else(|| VcsError::Http(format!("404 Not Found: {url}")))
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> VcsResult<String> {
        self.record(format!("get_default_branch {owner}/{repo}"))?;
        Ok(self
            .state()
            .default_branches
            .get(&repo_key(owner, repo))
            .cloned()
            .unwrap_or_else(|| "main".to_string()))
    }

    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> VcsResult<String> {
        self.record(format!("get_branch_sha {owner}/{repo}@{branch}"))?;
        Ok(fake_sha(&format!("{owner}/{repo}@{branch}")))
    }

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        from_sha: &str,
    ) -> VcsResult<()> {
        self.record(format!("create_branch {owner}/{repo}@{name}"))?;
        self.state().branches.push(CreatedBranch {
            owner: owner.to_string(),
            repo: repo.to_string(),
            name: name.to_string(),
            from_sha: from_sha.to_string(),
        });
        Ok(())
    }

    async fn put_file_content(
        &self,
        owner: &str,
        repo: &str,
        update: &FileUpdate,
    ) -> VcsResult<()> {
        self.record(format!(
            "put_file_content {owner}/{repo}/{}@{}",
            update.path, update.branch
        ))?;
        let envelope = ContentEnvelope {
            encoding: Some("base64".into()),
            content: Some(update.content_base64.clone()),
            sha: update.sha.clone(),
        };
        let text = envelope.decode_text()?;
        let mut state = self.state();
        state.files.insert(
            Self::branch_file_key(owner, repo, &update.path, &update.branch),
            text,
        );
        state.writes.push(WrittenFile {
            owner: owner.to_string(),
            repo: repo.to_string(),
            update: update.clone(),
        });
        Ok(())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> VcsResult<PullRequestRef> {
        self.record(format!("create_pull_request {owner}/{repo}"))?;
        let mut state = self.state();
        let number = state.pulls.len() as u64 + 1;
        let html_url = format!("https://github.com/{owner}/{repo}/pull/{number}");
        state.pulls.push(OpenedPullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            pull: pull.clone(),
            html_url: html_url.clone(),
        });
        Ok(PullRequestRef { number, html_url })
    }

    async fn get_collaborator_permission(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> VcsResult<PermissionLevel> {
        self.record(format!("get_collaborator_permission {owner}/{repo}/{username}"))?;
        Ok(self
            .state()
            .permissions
            .get(&(owner.to_string(), repo.to_string(), username.to_string()))
            .copied()
            .unwrap_or(PermissionLevel::None))
    }

    async fn check_org_membership(&self, org: &str, username: &str) -> VcsResult<bool> {
        self.record(format!("check_org_membership {org}/{username}"))?;
        Ok(self
            .state()
            .org_members
            .contains(&(org.to_string(), username.to_string())))
    }
}

#[async_trait]
impl Notifier for MockVersionControl {
    async fn post_comment(&self, event: &EventContext, message: &str) -> VcsResult<()> {
        self.record(format!(
            "post_comment {}/{}",
            event.repo_owner(),
            event.repo_name()
        ))?;
        self.state().comments.push(PostedComment {
            owner: event.repo_owner().to_string(),
            repo: event.repo_name().to_string(),
            number: event.thread_number(),
            body: message.to_string(),
        });
        Ok(())
    }
}
