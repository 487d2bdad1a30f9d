use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cs_core::config::Config;
use cs_core::event::EventContext;
use cs_integrations::github::client::GitHubClient;
use cs_integrations::types::GitHubConfig;
use cs_intelligence::llm::OpenRouterProvider;
use cs_sync::SyncContext;
use tracing::info;

use super::secret_from_env;

pub fn load_event(path: &Path) -> anyhow::Result<EventContext> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event file {}", path.display()))
}

pub async fn run(config: Config, event_path: &Path) -> anyhow::Result<()> {
    let event = load_event(event_path)?;
    info!(
        event = %event.event_name,
        owner = %event.repo_owner(),
        repo = %event.repo_name(),
        "loaded event"
    );

    let token = secret_from_env(&config.github.token_env)?;
    let github = Arc::new(
        GitHubClient::new(GitHubConfig {
            token: Some(token),
            api_base_url: config.github.api_base_url.clone(),
        })
        .context("failed to create GitHub client")?,
    );

    let api_key = secret_from_env(&config.llm.api_key_env)?;
    let provider = Arc::new(
        OpenRouterProvider::new(api_key)
            .with_base_url(&config.llm.base_url)
            .with_title("confsync"),
    );

    let ctx = SyncContext::new(event, config, github.clone(), github, provider)
        .context("failed to load configuration schema")?;
    let report = cs_sync::run(&ctx).await.context("sync failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.is_failure() {
        anyhow::bail!("no configuration file could be updated");
    }
    Ok(())
}
