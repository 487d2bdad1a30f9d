//! Target resolution precedence: repository, then organization, then the
//! configured defaults.

mod common;

use std::sync::Arc;

use common::*;
use cs_core::config::{Config, DefaultTarget, DefaultTargetType};
use cs_core::event::Account;
use cs_core::target::TargetKind;
use cs_core::vcs::PermissionLevel;
use cs_integrations::mock::MockVersionControl;
use cs_intelligence::llm::MockProvider;
use cs_sync::resolver::{resolve_targets, try_resolve, ResolveError};

fn ctx(vcs: &Arc<MockVersionControl>) -> cs_sync::SyncContext {
    context(event("/config enable pricing"), vcs.clone(), Arc::new(MockProvider::new()))
}

// ===========================================================================
// Repository tier
// ===========================================================================

#[tokio::test]
async fn repository_files_win_over_everything_else() {
    let vcs = Arc::new(
        github()
            .with_file(OWNER, REPO, CONFIG_PATH, CURRENT)
            .with_file(OWNER, REPO, DEV_CONFIG_PATH, CURRENT)
            .with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT),
    );

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert_eq!(targets.ids(), vec!["acme/widgets/config", "acme/widgets/dev"]);
    assert!(targets.iter().all(|t| !t.readonly));
    assert_eq!(
        targets.get("acme/widgets/config").unwrap().url,
        "https://github.com/acme/widgets.git"
    );
    assert_eq!(vcs.call_count("get_content acme/.ubiquity-os"), 0);
    assert_eq!(vcs.call_count("get_collaborator_permission"), 0);
}

#[tokio::test]
async fn dev_file_alone_is_enough() {
    let vcs = Arc::new(github().with_file(OWNER, REPO, DEV_CONFIG_PATH, CURRENT));

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert_eq!(targets.len(), 1);
    let target = targets.get("acme/widgets/dev").unwrap();
    assert_eq!(target.kind, TargetKind::Dev);
    assert_eq!(target.file_path, DEV_CONFIG_PATH);
}

#[tokio::test]
async fn repository_lookup_errors_count_as_absent() {
    let vcs = Arc::new(
        github()
            .failing("get_content acme/widgets/")
            .with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT),
    );

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert_eq!(targets.ids(), vec!["acme/.ubiquity-os/org-config"]);
}

// ===========================================================================
// Organization tier
// ===========================================================================

#[tokio::test]
async fn org_config_is_readonly_for_non_members() {
    let vcs = Arc::new(
        github()
            .with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT)
            .with_permission(OWNER, ".ubiquity-os", ACTOR, PermissionLevel::Admin),
    );

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    let target = targets.get("acme/.ubiquity-os/org-config").unwrap();
    assert_eq!(target.kind, TargetKind::OrgConfig);
    assert!(target.readonly);
    assert_eq!(vcs.call_count("check_org_membership acme/alice"), 1);
    assert_eq!(vcs.call_count("get_collaborator_permission"), 0);
}

#[tokio::test]
async fn org_config_is_writable_for_members_with_write() {
    let vcs = Arc::new(
        github()
            .with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT)
            .with_org_member(OWNER, ACTOR)
            .with_permission(OWNER, ".ubiquity-os", ACTOR, PermissionLevel::Write),
    );

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert!(!targets.get("acme/.ubiquity-os/org-config").unwrap().readonly);
}

#[tokio::test]
async fn org_members_with_read_access_stay_readonly() {
    let vcs = Arc::new(
        github()
            .with_file(OWNER, ".ubiquity-os", CONFIG_PATH, CURRENT)
            .with_org_member(OWNER, ACTOR)
            .with_permission(OWNER, ".ubiquity-os", ACTOR, PermissionLevel::Read),
    );

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert!(targets.get("acme/.ubiquity-os/org-config").unwrap().readonly);
}

#[tokio::test]
async fn payload_organization_takes_precedence_over_owner() {
    let vcs = Arc::new(github().with_file("acme-org", ".ubiquity-os", CONFIG_PATH, CURRENT));
    let mut event = event("/config enable pricing");
    event.payload.organization = Some(Account {
        login: "acme-org".into(),
    });
    let ctx = context(event, vcs.clone(), Arc::new(MockProvider::new()));

    let targets = try_resolve(&ctx).await.unwrap();

    assert_eq!(targets.ids(), vec!["acme-org/.ubiquity-os/org-config"]);
}

// ===========================================================================
// Default tier
// ===========================================================================

#[tokio::test]
async fn defaults_apply_when_nothing_else_exists() {
    let vcs = Arc::new(github().with_permission(
        "ubiquity-os",
        ".ubiquity-os",
        ACTOR,
        PermissionLevel::Write,
    ));

    let targets = try_resolve(&ctx(&vcs)).await.unwrap();

    assert_eq!(targets.ids(), vec!["ubiquity-os/.ubiquity-os/dev"]);
    let target = targets.get("ubiquity-os/.ubiquity-os/dev").unwrap();
    assert_eq!(target.url, "https://github.com/ubiquity-os/.ubiquity-os.git");
    assert_eq!(target.file_path, DEV_CONFIG_PATH);
    assert!(!target.readonly);
}

#[tokio::test]
async fn defaults_without_write_access_are_readonly() {
    let mut config = Config::default();
    config.sync.default_targets.push(DefaultTarget {
        name: "https://github.com/acme/fleet".into(),
        target_type: DefaultTargetType::Main,
    });
    let vcs = Arc::new(github());
    let ctx = context_with(
        event("/config enable pricing"),
        config,
        vcs.clone(),
        Arc::new(MockProvider::new()),
    );

    let targets = try_resolve(&ctx).await.unwrap();

    assert_eq!(
        targets.ids(),
        vec!["ubiquity-os/.ubiquity-os/dev", "acme/fleet/main"]
    );
    let main = targets.get("acme/fleet/main").unwrap();
    assert_eq!(main.file_path, CONFIG_PATH);
    assert!(targets.iter().all(|t| t.readonly));
}

#[tokio::test]
async fn malformed_default_url_yields_empty_scope() {
    let mut config = Config::default();
    config.sync.default_targets = vec![DefaultTarget {
        name: "https://gitlab.com/acme/fleet".into(),
        target_type: DefaultTargetType::Main,
    }];
    let vcs = Arc::new(github());
    let ctx = context_with(
        event("/config enable pricing"),
        config,
        vcs.clone(),
        Arc::new(MockProvider::new()),
    );

    assert!(matches!(
        try_resolve(&ctx).await,
        Err(ResolveError::InvalidUrl(url)) if url == "https://gitlab.com/acme/fleet"
    ));
    assert!(resolve_targets(&ctx).await.is_empty());
}

#[tokio::test]
async fn permission_failure_on_defaults_yields_empty_scope() {
    let vcs = Arc::new(github().failing("get_collaborator_permission"));

    assert!(try_resolve(&ctx(&vcs)).await.is_err());
    assert!(resolve_targets(&ctx(&vcs)).await.is_empty());
}

#[tokio::test]
async fn resolution_is_deterministic() {
    let vcs = Arc::new(
        github()
            .with_file(OWNER, REPO, CONFIG_PATH, CURRENT)
            .with_file(OWNER, REPO, DEV_CONFIG_PATH, CURRENT),
    );
    let ctx = ctx(&vcs);

    let first = resolve_targets(&ctx).await;
    let second = resolve_targets(&ctx).await;

    assert_eq!(first, second);
}
