//! Logging setup and run correlation for config-sync.
//!
//! - **Logging**: human-readable or JSON output via `tracing-subscriber`
//! - **Tracing**: per-invocation run ids and the span that carries them

pub mod logging;
pub mod tracing_setup;
