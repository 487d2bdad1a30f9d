use async_trait::async_trait;

use crate::event::EventContext;
use crate::vcs::VcsResult;

/// Posts user-visible status messages back to the triggering thread.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_comment(&self, event: &EventContext, message: &str) -> VcsResult<()>;
}
