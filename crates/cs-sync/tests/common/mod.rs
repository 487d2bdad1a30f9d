//! Shared fixtures: a comment in `acme/widgets` by `alice`, an in-memory
//! GitHub and a queued model.
#![allow(dead_code)]

use std::sync::Arc;

use cs_core::config::Config;
use cs_core::event::EventContext;
use cs_core::vcs::PermissionLevel;
use cs_integrations::mock::MockVersionControl;
use cs_intelligence::llm::MockProvider;
use cs_sync::SyncContext;

pub const OWNER: &str = "acme";
pub const REPO: &str = "widgets";
pub const ACTOR: &str = "alice";
pub const CONFIG_PATH: &str = ".github/.ubiquity-os.config.yml";
pub const DEV_CONFIG_PATH: &str = ".github/.ubiquity-os.config.dev.yml";
pub const COMMENT_URL: &str = "https://github.com/acme/widgets/issues/7#issuecomment-42";

pub const PARSER_OWNER: &str = "ubiquity-os";
pub const PARSER_REPO: &str = "ubiquity-os-kernel";
pub const PARSER_FILE: &str = "src/github/types/plugin-configuration.ts";
pub const PARSER_CODE: &str = "export const configSchema = T.Object({ plugins: T.Array(handler) });";

pub const CURRENT: &str = "plugins:\n  - uses:\n      - plugin: acme/daemon-pricing@main\n";
pub const VALID: &str = "plugins:\n  - uses:\n      - plugin: acme/daemon-pricing@main\n        with:\n          basePriceMultiplier: 2\n";
pub const MISSING_USES: &str = "plugins:\n  - name: broken\n";

pub fn event_with(event_name: &str, body: &str, user_type: &str) -> EventContext {
    serde_json::from_value(serde_json::json!({
        "eventName": event_name,
        "payload": {
            "repository": { "name": REPO, "owner": { "login": OWNER } },
            "sender": { "login": ACTOR },
            "comment": {
                "body": body,
                "html_url": COMMENT_URL,
                "user": { "login": ACTOR, "type": user_type }
            },
            "issue": { "number": 7 }
        }
    }))
    .unwrap()
}

pub fn event(body: &str) -> EventContext {
    event_with("issue_comment.created", body, "User")
}

/// Parser source plus the daemon-pricing manifest.
pub fn github() -> MockVersionControl {
    MockVersionControl::new()
        .with_file(PARSER_OWNER, PARSER_REPO, PARSER_FILE, PARSER_CODE)
        .with_file(
            "acme",
            "daemon-pricing",
            "manifest.json",
            r#"{ "name": "daemon-pricing", "configuration": { "type": "object" } }"#,
        )
}

/// [`github`] with a repository configuration the actor can write.
pub fn github_with_repo_config() -> MockVersionControl {
    github()
        .with_file(OWNER, REPO, CONFIG_PATH, CURRENT)
        .with_permission(OWNER, REPO, ACTOR, PermissionLevel::Write)
}

pub fn context_with(
    event: EventContext,
    config: Config,
    vcs: Arc<MockVersionControl>,
    provider: Arc<MockProvider>,
) -> SyncContext {
    SyncContext::new(event, config, vcs.clone(), vcs, provider).unwrap()
}

pub fn context(
    event: EventContext,
    vcs: Arc<MockVersionControl>,
    provider: Arc<MockProvider>,
) -> SyncContext {
    context_with(event, Config::default(), vcs, provider)
}
