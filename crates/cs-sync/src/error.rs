use cs_core::vcs::VcsError;
use thiserror::Error;

use crate::resolver::ResolveError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Comment is from a bot. Skipping.")]
    BotAuthor,

    #[error("Editor instruction is empty.")]
    EmptyInstruction,

    #[error("Event {0} is not supported.")]
    UnsupportedEvent(String),

    #[error("User {user} does not have write access to {repository}. Skipping.")]
    PermissionDenied { user: String, repository: String },

    #[error("Invalid parser repository URL: {0}")]
    InvalidParserPath(String),

    #[error("Parser code not found at {0}")]
    ParserCodeNotFound(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
