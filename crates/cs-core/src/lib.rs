pub mod config;
pub mod event;
pub mod format;
pub mod manifest;
pub mod notify;
pub mod plugin;
pub mod schema;
pub mod target;
pub mod vcs;
