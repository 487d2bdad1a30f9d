//! Inbound comment event payloads.

use serde::{Deserialize, Serialize};

pub const ISSUE_COMMENT_CREATED: &str = "issue_comment.created";
pub const REVIEW_COMMENT_CREATED: &str = "pull_request_review_comment.created";

/// Slash command that triggers a config edit.
pub const CONFIG_COMMAND: &str = "config";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedEvent {
    IssueCommentCreated,
    ReviewCommentCreated,
}

impl SupportedEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            ISSUE_COMMENT_CREATED => Some(SupportedEvent::IssueCommentCreated),
            REVIEW_COMMENT_CREATED => Some(SupportedEvent::ReviewCommentCreated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl User {
    pub fn is_bot(&self) -> bool {
        self.kind.as_deref() == Some("Bot")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub repository: Repository,
    #[serde(default)]
    pub organization: Option<Account>,
    pub sender: Account,
    pub comment: Comment,
    #[serde(default)]
    pub issue: Option<IssueRef>,
    #[serde(default)]
    pub pull_request: Option<IssueRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandParameters {
    pub editor_instruction: String,
}

/// Command already parsed by the dispatching kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub parameters: CommandParameters,
}

/// A comment event together with its (optional) parsed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub event_name: String,
    pub payload: CommentPayload,
    #[serde(default)]
    pub command: Option<Command>,
}

impl EventContext {
    pub fn supported_event(&self) -> Option<SupportedEvent> {
        SupportedEvent::from_name(&self.event_name)
    }

    /// Login of the comment author, falling back to the event sender.
    pub fn actor(&self) -> &str {
        self.payload
            .comment
            .user
            .as_ref()
            .map(|u| u.login.as_str())
            .unwrap_or(self.payload.sender.login.as_str())
    }

    pub fn repo_owner(&self) -> &str {
        &self.payload.repository.owner.login
    }

    pub fn repo_name(&self) -> &str {
        &self.payload.repository.name
    }

    /// Organization login: explicit organization first, then the repository owner.
    pub fn org_login(&self) -> Option<&str> {
        self.payload
            .organization
            .as_ref()
            .map(|o| o.login.as_str())
            .or(Some(self.repo_owner()))
            .filter(|login| !login.is_empty())
    }

    /// Issue or pull request number the comment belongs to.
    pub fn thread_number(&self) -> Option<u64> {
        self.payload
            .issue
            .as_ref()
            .or(self.payload.pull_request.as_ref())
            .map(|i| i.number)
    }

    /// The editor instruction carried by this event.
    ///
    /// A parsed `config` command wins; otherwise the comment body must start
    /// with `/config`. Returns `None` when neither applies and `Some("")`
    /// when the command is present but empty.
    pub fn editor_instruction(&self) -> Option<String> {
        if let Some(command) = self.command.as_ref().filter(|c| c.name == CONFIG_COMMAND) {
            return Some(command.parameters.editor_instruction.trim().to_string());
        }

        let body = self.payload.comment.body.trim();
        let rest = body.strip_prefix(&format!("/{CONFIG_COMMAND}"))?;
        // `/configuration` is a different word, not `/config` plus text.
        if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            return None;
        }
        Some(rest.trim().to_string())
    }
}
