pub mod agent;
pub mod apply;
pub mod context;
pub mod error;
pub mod handler;
pub mod manifests;
pub mod permissions;
pub mod process;
pub mod resolver;

pub use context::SyncContext;
pub use error::SyncError;
pub use handler::{handle_event, run, SyncReport, TargetFailure};
