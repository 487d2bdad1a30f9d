//! Two-phase sync across every resolved target.
//!
//! Phase one reads each target and warms the manifest cache so that every
//! plugin manifest is fetched at most once. Phase two edits and publishes
//! the writable targets. A failing target is logged and skipped; it never
//! stops the others.

use cs_core::target::{parse_github_url, TargetMap};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::SyncContext;
use crate::error::{Result, SyncError};
use crate::manifests::ManifestCache;
use crate::process::{fetch_and_parse, process_target, TargetOutcome};
use crate::resolver::resolve_targets;

/// What happened to each target during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReport {
    pub pull_requests: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped_readonly: Vec<String>,
    /// `(target id, error)` for targets that failed.
    pub failed: Vec<(String, String)>,
}

/// Download the parser source shown to the model.
pub async fn fetch_parser_code(ctx: &SyncContext) -> Result<String> {
    let sync = &ctx.config.sync;
    let (owner, repo) = parse_github_url(&sync.parser_path)
        .ok_or_else(|| SyncError::InvalidParserPath(sync.parser_path.clone()))?;

    ctx.vcs
        .get_file_content(&owner, &repo, &sync.parser_file, None)
        .await?
        .ok_or_else(|| {
            SyncError::ParserCodeNotFound(format!("{owner}/{repo}/{}", sync.parser_file))
        })
}

pub async fn sync_agent(ctx: &SyncContext, instruction: &str) -> Result<AgentReport> {
    let targets = resolve_targets(ctx).await;
    info!(targets = ?targets.ids(), "resolved targets");
    let parser_code = fetch_parser_code(ctx).await?;
    Ok(sync_targets(ctx, &targets, &parser_code, instruction).await)
}

/// Run both phases over an already resolved target map.
pub async fn sync_targets(
    ctx: &SyncContext,
    targets: &TargetMap,
    parser_code: &str,
    instruction: &str,
) -> AgentReport {
    let mut cache = ManifestCache::new();
    let mut report = AgentReport::default();

    // Phase 1
    for target in targets {
        if let Err(e) = fetch_and_parse(ctx, target, &mut cache).await {
            warn!(target = %target.id(), error = %e, "failed to fetch target");
        }
    }
    info!(manifests = cache.len(), "manifest cache warmed");

    // Phase 2
    for target in targets {
        if target.readonly {
            info!(target = %target.id(), "skipping read-only target");
            report.skipped_readonly.push(target.id());
            continue;
        }

        match process_target(ctx, target, parser_code, instruction, &mut cache).await {
            Ok(TargetOutcome::PullRequest(applied)) => {
                report.pull_requests.push(applied.pull_request_url)
            }
            Ok(TargetOutcome::NoChange) => report.unchanged.push(target.id()),
            Err(e) => {
                warn!(target = %target.id(), error = %e, "failed to process target");
                report.failed.push((target.id(), e.to_string()));
            }
        }
    }

    report
}
