//! Decide which configuration files an instruction applies to.
//!
//! Resolution is tiered. The originating repository wins when it carries a
//! configuration file. Otherwise the organization's shared configuration
//! repository is used, and when neither exists the configured default
//! targets are. Each tier only runs when the previous one produced nothing.

use cs_core::config::DefaultTargetType;
use cs_core::target::{parse_github_url, Target, TargetKind, TargetMap};
use cs_core::vcs::VcsError;
use thiserror::Error;
use tracing::{error, info};

use crate::context::SyncContext;
use crate::permissions::{has_org_write, has_repo_write};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("organization not found in payload")]
    MissingOrganization,

    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Resolve targets, logging any failure and returning an empty map instead.
pub async fn resolve_targets(ctx: &SyncContext) -> TargetMap {
    match try_resolve(ctx).await {
        Ok(targets) => targets,
        Err(e) => {
            error!(error = %e, "error resolving target scope");
            TargetMap::new()
        }
    }
}

pub async fn try_resolve(ctx: &SyncContext) -> Result<TargetMap, ResolveError> {
    let mut targets = TargetMap::new();

    resolve_repo_targets(ctx, &mut targets).await;
    if !targets.is_empty() {
        info!(targets = ?targets.ids(), "using repository configuration");
        return Ok(targets);
    }

    resolve_org_target(ctx, &mut targets).await?;
    if !targets.is_empty() {
        info!(targets = ?targets.ids(), "using organization configuration");
        return Ok(targets);
    }

    resolve_default_targets(ctx, &mut targets).await?;
    info!(targets = ?targets.ids(), "using default targets");
    Ok(targets)
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

async fn resolve_repo_targets(ctx: &SyncContext, targets: &mut TargetMap) {
    let owner = ctx.event.repo_owner();
    let repo = ctx.event.repo_name();
    let sync = &ctx.config.sync;

    for (kind, path) in [
        (TargetKind::Config, sync.config_path.as_str()),
        (TargetKind::Dev, sync.dev_config_path.as_str()),
    ] {
        match ctx.vcs.get_file_content(owner, repo, path, None).await {
            Ok(Some(_)) => {
                targets.insert(Target::new(kind, owner, repo, path));
            }
            Ok(None) => {}
            Err(e) => info!(%owner, %repo, %path, error = %e, "no repository configuration"),
        }
    }
}

async fn resolve_org_target(
    ctx: &SyncContext,
    targets: &mut TargetMap,
) -> Result<(), ResolveError> {
    let org = ctx
        .event
        .org_login()
        .ok_or(ResolveError::MissingOrganization)?;
    let repo = ctx.config.sync.org_config_repo.as_str();
    let path = ctx.config.sync.config_path.as_str();

    match org_target(ctx, org, repo, path).await {
        Ok(Some(target)) => {
            targets.insert(target);
        }
        Ok(None) => info!("No configuration found at repository or organization level."),
        Err(e) => info!(%org, %repo, error = %e, "no organization configuration"),
    }
    Ok(())
}

async fn org_target(
    ctx: &SyncContext,
    org: &str,
    repo: &str,
    path: &str,
) -> Result<Option<Target>, VcsError> {
    if ctx.vcs.get_file_content(org, repo, path, None).await?.is_none() {
        return Ok(None);
    }
    let can_write = has_org_write(ctx.vcs.as_ref(), org, repo, ctx.actor()).await?;
    Ok(Some(
        Target::new(TargetKind::OrgConfig, org, repo, path).with_readonly(!can_write),
    ))
}

async fn resolve_default_targets(
    ctx: &SyncContext,
    targets: &mut TargetMap,
) -> Result<(), ResolveError> {
    let sync = &ctx.config.sync;

    for default in &sync.default_targets {
        let (owner, repo) = parse_github_url(&default.name)
            .ok_or_else(|| ResolveError::InvalidUrl(default.name.clone()))?;
        let (kind, path) = match default.target_type {
            DefaultTargetType::Dev => (TargetKind::Dev, sync.dev_config_path.as_str()),
            DefaultTargetType::Main => (TargetKind::Main, sync.config_path.as_str()),
        };
        let can_write = has_repo_write(ctx.vcs.as_ref(), &owner, &repo, ctx.actor()).await?;
        targets.insert(
            Target::new(kind, &owner, &repo, path)
                .with_url(&default.name)
                .with_readonly(!can_write),
        );
    }
    Ok(())
}
