//! Entry point for a comment event.

use cs_core::event::SupportedEvent;
use cs_telemetry::tracing_setup::sync_span;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn, Instrument};

use crate::agent::sync_agent;
use crate::context::SyncContext;
use crate::error::{Result, SyncError};
use crate::permissions::has_repo_write;

pub const NO_INSTRUCTION_MESSAGE: &str = "No editor instruction found in comment. Skipping.";
pub const NO_PULL_REQUESTS_MESSAGE: &str = "No pull requests were created.";

/// A target that could not be updated, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFailure {
    pub target: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncReport {
    /// The comment carried no instruction.
    Skipped,
    /// Nothing failed and nothing needed a change.
    Unchanged { targets: Vec<String> },
    /// No pull request was opened and at least one target failed.
    Failed {
        unchanged: Vec<String>,
        failures: Vec<TargetFailure>,
    },
    Created {
        pull_requests: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        failures: Vec<TargetFailure>,
    },
}

impl SyncReport {
    /// True when the run was meant to edit something and could not.
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncReport::Failed { .. })
    }
}

fn failure_listing(failures: &[TargetFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("- `{}`: {}", f.target, f.error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate the event and run the sync, posting the outcome as a comment.
pub async fn handle_event(ctx: &SyncContext) -> Result<SyncReport> {
    let event = &ctx.event;
    if event.payload.comment.user.as_ref().is_some_and(|u| u.is_bot()) {
        return Err(SyncError::BotAuthor);
    }

    let Some(instruction) = event.editor_instruction() else {
        info!("{NO_INSTRUCTION_MESSAGE}");
        ctx.notify(NO_INSTRUCTION_MESSAGE).await?;
        return Ok(SyncReport::Skipped);
    };
    if instruction.is_empty() {
        return Err(SyncError::EmptyInstruction);
    }

    if event.supported_event() != Some(SupportedEvent::IssueCommentCreated) {
        return Err(SyncError::UnsupportedEvent(event.event_name.clone()));
    }

    let (owner, repo) = (event.repo_owner(), event.repo_name());
    if !has_repo_write(ctx.vcs.as_ref(), owner, repo, ctx.actor()).await? {
        return Err(SyncError::PermissionDenied {
            user: ctx.actor().to_string(),
            repository: ctx.repository(),
        });
    }

    info!(%instruction, "running sync");
    let report = sync_agent(ctx, &instruction).await?;
    let failures: Vec<TargetFailure> = report
        .failed
        .into_iter()
        .map(|(target, error)| TargetFailure { target, error })
        .collect();
    if !failures.is_empty() {
        warn!(failed = failures.len(), "some targets failed");
    }

    if report.pull_requests.is_empty() {
        if failures.is_empty() {
            ctx.notify(NO_PULL_REQUESTS_MESSAGE).await?;
            return Ok(SyncReport::Unchanged {
                targets: report.unchanged,
            });
        }
        ctx.notify(&format!(
            "{NO_PULL_REQUESTS_MESSAGE}\n\n{}",
            failure_listing(&failures)
        ))
        .await?;
        return Ok(SyncReport::Failed {
            unchanged: report.unchanged,
            failures,
        });
    }

    let listing = report
        .pull_requests
        .iter()
        .map(|url| format!("- {url}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    ctx.notify(&listing).await?;
    Ok(SyncReport::Created {
        pull_requests: report.pull_requests,
        failures,
    })
}

/// [`handle_event`] inside a run span. Any error is posted to the thread
/// before it is returned.
pub async fn run(ctx: &SyncContext) -> Result<SyncReport> {
    let (span, run_id) = sync_span(&ctx.event.event_name, &ctx.repository());

    async {
        info!(%run_id, "sync started");
        match handle_event(ctx).await {
            Ok(report) => {
                info!(?report, "sync finished");
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "sync failed");
                if let Err(post_error) = ctx.notify(&e.to_string()).await {
                    error!(error = %post_error, "failed to post error comment");
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
