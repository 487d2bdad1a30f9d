//! Everything one sync invocation needs, bundled so the pipeline stages take
//! a single borrowed handle.

use std::sync::Arc;

use cs_core::config::Config;
use cs_core::event::EventContext;
use cs_core::notify::Notifier;
use cs_core::schema::{ConfigSchema, SchemaError};
use cs_core::vcs::VersionControl;
use cs_intelligence::generation::{GenerationSettings, Generator};
use cs_intelligence::llm::LlmProvider;

pub struct SyncContext {
    pub event: EventContext,
    pub config: Config,
    pub vcs: Arc<dyn VersionControl>,
    pub notifier: Arc<dyn Notifier>,
    pub generator: Generator,
}

impl SyncContext {
    /// Build a context with the bundled configuration schema.
    pub fn new(
        event: EventContext,
        config: Config,
        vcs: Arc<dyn VersionControl>,
        notifier: Arc<dyn Notifier>,
        provider: Arc<dyn LlmProvider>,
    ) -> Result<Self, SchemaError> {
        let schema = Arc::new(ConfigSchema::new()?);
        Ok(Self::with_schema(event, config, vcs, notifier, provider, schema))
    }

    pub fn with_schema(
        event: EventContext,
        config: Config,
        vcs: Arc<dyn VersionControl>,
        notifier: Arc<dyn Notifier>,
        provider: Arc<dyn LlmProvider>,
        schema: Arc<ConfigSchema>,
    ) -> Self {
        let settings = GenerationSettings::from(&config.llm);
        Self {
            generator: Generator::new(provider, schema, settings),
            event,
            config,
            vcs,
            notifier,
        }
    }

    /// Login the sync acts on behalf of.
    pub fn actor(&self) -> &str {
        self.event.actor()
    }

    /// `owner/repo` of the repository the comment was posted in.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.event.repo_owner(), self.event.repo_name())
    }

    /// Post a status message to the triggering thread.
    pub async fn notify(&self, message: &str) -> cs_core::vcs::VcsResult<()> {
        self.notifier.post_comment(&self.event, message).await
    }
}
