pub mod github;
pub mod mock;
pub mod types;
