pub mod client;
pub mod comments;
pub mod contents;
pub mod permissions;
pub mod pull_requests;
mod version_control;
