//! Per-target work: read the file, gather its manifests, generate the edit
//! and publish it.

use cs_core::format::format_yaml;
use cs_core::manifest::Manifest;
use cs_core::schema::parse_config;
use cs_core::target::Target;
use cs_core::vcs::VcsError;
use cs_intelligence::generation::{GenerationError, GenerationRequest};
use thiserror::Error;
use tracing::{info, warn};

use crate::apply::{apply_change, commit_message, AppliedChange, Attribution};
use crate::context::SyncContext;
use crate::manifests::{resolve_manifests, ManifestCache, ManifestFetchError};

pub const NO_CHANGE_MESSAGE: &str = "No change was triggered by the instruction.";

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("target {0} is read-only")]
    Readonly(String),

    #[error("no configuration file at {target}")]
    FileNotFound { target: String },

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Current state of a target file with its resolved manifests.
#[derive(Debug)]
pub struct FetchedTarget {
    pub content: String,
    pub manifests: Vec<Manifest>,
    pub warnings: Vec<ManifestFetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    PullRequest(AppliedChange),
    /// The edited file matched the current one; nothing was published.
    NoChange,
}

pub async fn fetch_and_parse(
    ctx: &SyncContext,
    target: &Target,
    cache: &mut ManifestCache,
) -> Result<FetchedTarget, TargetError> {
    let content = ctx
        .vcs
        .get_file_content(&target.owner, &target.repo, &target.file_path, None)
        .await?
        .ok_or_else(|| TargetError::FileNotFound {
            target: format!("{}/{}/{}", target.owner, target.repo, target.file_path),
        })?;

    let locations = parse_config(&content);
    let resolved = resolve_manifests(ctx.vcs.as_ref(), &locations, cache).await;
    info!(
        target = %target.id(),
        plugins = locations.len(),
        manifests = resolved.manifests.len(),
        "fetched target"
    );

    Ok(FetchedTarget {
        content,
        manifests: resolved.manifests,
        warnings: resolved.warnings,
    })
}

/// Rewrite one target according to `instruction`.
///
/// Read-only targets are refused. When the formatted result equals the
/// current file (ignoring surrounding whitespace) a notice is posted and no
/// branch or pull request is created.
pub async fn process_target(
    ctx: &SyncContext,
    target: &Target,
    parser_code: &str,
    instruction: &str,
    cache: &mut ManifestCache,
) -> Result<TargetOutcome, TargetError> {
    if target.readonly {
        return Err(TargetError::Readonly(target.id()));
    }

    let fetched = fetch_and_parse(ctx, target, cache).await?;
    let generated = ctx
        .generator
        .generate(&GenerationRequest {
            current_content: &fetched.content,
            parser_code,
            manifests: &fetched.manifests,
            context_url: &target.url,
            instruction,
        })
        .await?;

    let updated = match format_yaml(&generated.text) {
        Ok(formatted) => formatted,
        Err(e) => {
            warn!(target = %target.id(), error = %e, "formatting failed, using raw output");
            generated.text
        }
    };

    if updated.trim() == fetched.content.trim() {
        info!(target = %target.id(), "instruction produced no change");
        if let Err(e) = ctx.notify(NO_CHANGE_MESSAGE).await {
            warn!(target = %target.id(), error = %e, "failed to post no-change comment");
        }
        return Ok(TargetOutcome::NoChange);
    }

    let attribution = Attribution {
        sender: ctx.actor(),
        comment_url: &ctx.event.payload.comment.html_url,
    };
    let applied = apply_change(
        ctx.vcs.as_ref(),
        target,
        &updated,
        &commit_message(&target.file_path),
        instruction,
        &attribution,
    )
    .await?;
    Ok(TargetOutcome::PullRequest(applied))
}
