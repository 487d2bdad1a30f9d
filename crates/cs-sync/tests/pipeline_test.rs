//! End-to-end sync runs against the in-memory GitHub and a queued model.

mod common;

use std::sync::Arc;

use common::*;
use cs_core::config::Config;
use cs_core::format::format_yaml;
use cs_core::target::{Target, TargetKind, TargetMap};
use cs_intelligence::llm::{MockProvider, Role};
use cs_sync::agent::{fetch_parser_code, sync_agent, sync_targets};
use cs_sync::manifests::ManifestCache;
use cs_sync::process::{process_target, TargetError, NO_CHANGE_MESSAGE};
use cs_sync::SyncError;

const INSTRUCTION: &str = "double the base price multiplier";

// ===========================================================================
// Happy path
// ===========================================================================

#[tokio::test]
async fn one_target_one_pull_request() {
    let vcs = Arc::new(github_with_repo_config());
    let provider = Arc::new(MockProvider::new().with_text(VALID));
    let ctx = context(event("/config double it"), vcs.clone(), provider.clone());

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.pull_requests, vec!["https://github.com/acme/widgets/pull/1"]);
    assert!(report.failed.is_empty());

    let pulls = vcs.pull_requests();
    assert_eq!(pulls.len(), 1);
    let pull = &pulls[0].pull;
    assert_eq!(pull.title, "chore: update `.github/.ubiquity-os.config.yml`");
    assert_eq!(
        pull.body,
        format!("> {INSTRUCTION}.\n\n _Originally posted by @alice in {COMMENT_URL}_")
    );
    assert_eq!(pull.base, "main");
    assert!(pull.head.starts_with("update-config-"));

    let branches = vcs.branches();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].name, pull.head);

    let writes = vcs.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].update.message, format!("Update {CONFIG_PATH}"));
    assert_eq!(writes[0].update.branch, pull.head);
    assert_eq!(
        vcs.file(OWNER, REPO, CONFIG_PATH, Some(pull.head.as_str())),
        Some(format_yaml(VALID).unwrap())
    );
    assert_eq!(vcs.file(OWNER, REPO, CONFIG_PATH, None).as_deref(), Some(CURRENT));
}

#[tokio::test]
async fn prompt_carries_file_parser_and_manifests() {
    let vcs = Arc::new(github_with_repo_config());
    let provider = Arc::new(MockProvider::new().with_text(VALID));
    let ctx = context(event("/config double it"), vcs.clone(), provider.clone());

    sync_agent(&ctx, INSTRUCTION).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;
    assert_eq!(requests[0].options.temperature, 0.0);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains(CURRENT));
    assert!(messages[0].content.contains(PARSER_CODE));
    assert!(messages[0].content.contains("### daemon-pricing - Start"));
    assert!(messages[0].content.contains("https://github.com/acme/widgets.git"));
    assert_eq!(messages[1].content, INSTRUCTION);
}

#[tokio::test]
async fn manifests_are_fetched_once_across_both_phases() {
    let vcs = Arc::new(github_with_repo_config().with_file(OWNER, REPO, DEV_CONFIG_PATH, CURRENT));
    let provider = Arc::new(MockProvider::new().with_text(VALID).with_text(VALID));
    let ctx = context(event("/config double it"), vcs.clone(), provider);

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.pull_requests.len(), 2);
    assert_eq!(vcs.call_count("get_content acme/daemon-pricing/manifest.json"), 1);
}

// ===========================================================================
// Retry loop
// ===========================================================================

#[tokio::test]
async fn invalid_output_is_retried_until_valid() {
    let vcs = Arc::new(github_with_repo_config());
    let provider = Arc::new(
        MockProvider::new()
            .with_text(MISSING_USES)
            .with_text(MISSING_USES)
            .with_text(VALID),
    );
    let ctx = context(event("/config double it"), vcs.clone(), provider.clone());

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.pull_requests.len(), 1);
    assert_eq!(provider.call_count(), 3);
    let third = &provider.requests()[2];
    assert_eq!(third.messages.len(), 3);
    assert!(third.messages[2].content.contains("uses"));
    assert!((third.options.temperature - 0.2).abs() < f32::EPSILON);
}

#[tokio::test]
async fn exhausted_retries_publish_nothing() {
    let vcs = Arc::new(github_with_repo_config());
    let provider = Arc::new(
        MockProvider::new()
            .with_text(MISSING_USES)
            .with_text(MISSING_USES)
            .with_text(MISSING_USES),
    );
    let ctx = context(event("/config double it"), vcs.clone(), provider.clone());

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert!(report.pull_requests.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("after 3 attempts"));
    assert_eq!(provider.call_count(), 3);
    assert!(vcs.branches().is_empty());
    assert!(vcs.writes().is_empty());
    assert!(vcs.pull_requests().is_empty());
}

// ===========================================================================
// No-op and read-only targets
// ===========================================================================

#[tokio::test]
async fn unchanged_output_posts_notice_and_opens_nothing() {
    let vcs = Arc::new(github_with_repo_config());
    let provider = Arc::new(MockProvider::new().with_text(format!("\n{CURRENT}\n\n")));
    let ctx = context(event("/config double it"), vcs.clone(), provider);

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert!(report.pull_requests.is_empty());
    assert_eq!(report.unchanged, vec!["acme/widgets/config"]);
    assert!(vcs.branches().is_empty());
    let comments = vcs.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].body, NO_CHANGE_MESSAGE);
    assert_eq!(comments[0].number, Some(7));
}

#[tokio::test]
async fn unchanged_output_survives_a_failed_comment_post() {
    let vcs = Arc::new(github_with_repo_config().failing("post_comment acme/widgets"));
    let provider = Arc::new(MockProvider::new().with_text(CURRENT));
    let ctx = context(event("/config double it"), vcs.clone(), provider);

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.unchanged, vec!["acme/widgets/config"]);
    assert!(report.failed.is_empty());
    assert!(vcs.comments().is_empty());
}

#[tokio::test]
async fn readonly_targets_never_reach_the_model() {
    let vcs = Arc::new(github().with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT));
    let provider = Arc::new(MockProvider::new().with_text(VALID));
    let ctx = context(event("/config double it"), vcs.clone(), provider.clone());

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.skipped_readonly, vec!["acme/.ubiquity-os/org-config"]);
    assert_eq!(provider.call_count(), 0);
    assert!(vcs.branches().is_empty());
    // Read-only targets are still read in the first phase.
    assert_eq!(vcs.call_count("get_content acme/daemon-pricing/manifest.json"), 1);
}

#[tokio::test]
async fn process_target_refuses_readonly() {
    let vcs = Arc::new(github_with_repo_config());
    let ctx = context(event("/config x"), vcs.clone(), Arc::new(MockProvider::new()));
    let target = Target::new(TargetKind::Config, OWNER, REPO, CONFIG_PATH).with_readonly(true);

    let result = process_target(&ctx, &target, PARSER_CODE, INSTRUCTION, &mut ManifestCache::new()).await;

    assert!(matches!(result, Err(TargetError::Readonly(id)) if id == "acme/widgets/config"));
    assert!(vcs.calls().is_empty());
}

// ===========================================================================
// Failure isolation
// ===========================================================================

#[tokio::test]
async fn one_failing_target_does_not_stop_the_others() {
    let vcs = Arc::new(
        github_with_repo_config()
            .with_file(OWNER, REPO, DEV_CONFIG_PATH, CURRENT)
            .failing("put_file_content acme/widgets/.github/.ubiquity-os.config.yml@"),
    );
    let provider = Arc::new(MockProvider::new().with_text(VALID).with_text(VALID));
    let ctx = context(event("/config double it"), vcs.clone(), provider);

    let report = sync_agent(&ctx, INSTRUCTION).await.unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "acme/widgets/config");
    assert_eq!(report.pull_requests, vec!["https://github.com/acme/widgets/pull/1"]);
    assert_eq!(vcs.pull_requests()[0].pull.title, format!("chore: update `{DEV_CONFIG_PATH}`"));
}

#[tokio::test]
async fn missing_target_file_is_reported_per_target() {
    let vcs = Arc::new(github());
    let ctx = context(event("/config x"), vcs.clone(), Arc::new(MockProvider::new()));
    let targets: TargetMap = [Target::new(TargetKind::Main, OWNER, "gone", CONFIG_PATH)]
        .into_iter()
        .collect();

    let report = sync_targets(&ctx, &targets, PARSER_CODE, INSTRUCTION).await;

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("acme/gone"));
}

// ===========================================================================
// Parser source
// ===========================================================================

#[tokio::test]
async fn parser_code_comes_from_the_kernel_repository() {
    let vcs = Arc::new(github());
    let ctx = context(event("/config x"), vcs.clone(), Arc::new(MockProvider::new()));

    assert_eq!(fetch_parser_code(&ctx).await.unwrap(), PARSER_CODE);
    assert_eq!(
        vcs.call_count(&format!("get_content {PARSER_OWNER}/{PARSER_REPO}/{PARSER_FILE}@")),
        1
    );
}

#[tokio::test]
async fn missing_parser_code_aborts_the_run() {
    let vcs = Arc::new(
        cs_integrations::mock::MockVersionControl::new().with_file(OWNER, REPO, CONFIG_PATH, CURRENT),
    );
    let provider = Arc::new(MockProvider::new());
    let ctx = context(event("/config x"), vcs.clone(), provider.clone());

    let err = sync_agent(&ctx, INSTRUCTION).await.unwrap_err();

    assert!(matches!(err, SyncError::ParserCodeNotFound(_)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn invalid_parser_path_is_rejected() {
    let mut config = Config::default();
    config.sync.parser_path = "ubiquity-os-kernel".into();
    let ctx = context_with(
        event("/config x"),
        config,
        Arc::new(github_with_repo_config()),
        Arc::new(MockProvider::new()),
    );

    let err = sync_agent(&ctx, INSTRUCTION).await.unwrap_err();

    assert!(matches!(err, SyncError::InvalidParserPath(p) if p == "ubiquity-os-kernel"));
}
